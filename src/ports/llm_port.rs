//! Language-model completion port used by the assistant.

use crate::domain::error::TerminalError;
use async_trait::async_trait;

#[async_trait]
pub trait LanguageModelPort: Send + Sync {
    /// Send a single user prompt and return the free-text reply.
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, TerminalError>;
}
