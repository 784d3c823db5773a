//! Historical price data port.

use crate::domain::bar::{BarFetch, BarRequest};
use crate::domain::error::TerminalError;
use async_trait::async_trait;

/// Source of OHLCV bars.
///
/// Implementations distinguish "the source has nothing for this request"
/// (`Ok(BarFetch::NoData)`) from a hard failure (`Err(TerminalError::Fetch)`).
#[async_trait]
pub trait BarPort: Send + Sync {
    async fn fetch_bars(&self, request: &BarRequest) -> Result<BarFetch, TerminalError>;
}
