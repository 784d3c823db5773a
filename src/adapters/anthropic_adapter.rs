//! Anthropic messages API adapter for assistant suggestions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::TerminalError;
use crate::ports::llm_port::LanguageModelPort;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

impl AnthropicAdapter {
    pub fn new(endpoint: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

fn first_text(response: MessagesResponse) -> Result<String, TerminalError> {
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| TerminalError::Assistant {
            reason: "reply has no text content".into(),
        })
}

#[async_trait]
impl LanguageModelPort for AnthropicAdapter {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, TerminalError> {
        let assistant_error = |reason: String| TerminalError::Assistant { reason };
        debug!(model = %self.model, max_tokens = self.max_tokens, "sending messages request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| assistant_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(assistant_error(format!("API error: {}", response.status())));
        }

        let body = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| assistant_error(format!("invalid reply: {}", e)))?;
        first_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let adapter = AnthropicAdapter::new("http://localhost", "claude-3-haiku-20240307", 150);
        let body = serde_json::to_value(adapter.request("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 150,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn first_text_block_is_reply() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "support - mark level"}]}"#,
        )
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "support - mark level");
    }

    #[test]
    fn missing_content_is_error() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(first_text(response), Err(TerminalError::Assistant { .. })));
    }
}
