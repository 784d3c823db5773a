//! HTTP history service bar adapter.
//!
//! `GET {base_url}/history?symbol=&period=&interval=` returning either a JSON
//! array of bars or `{"error": "..."}`. The service works in periods rather
//! than ranges, so the period is chosen to cover the requested span.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::bar::{Bar, BarFetch, BarRequest, Resolution, validate_series};
use crate::domain::error::TerminalError;
use crate::ports::bar_port::BarPort;

pub struct HttpBarAdapter {
    client: Client,
    base_url: String,
}

impl HttpBarAdapter {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

pub fn interval_for(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Minute1 => "1m",
        Resolution::Minute5 => "5m",
        Resolution::Minute15 => "15m",
        Resolution::Minute30 => "30m",
        Resolution::Minute60 => "1h",
        Resolution::Day => "1d",
        Resolution::Week => "1wk",
        Resolution::Month => "1mo",
    }
}

pub fn period_for(span_days: i64) -> &'static str {
    match span_days {
        d if d > 730 => "5y",
        d if d > 365 => "2y",
        d if d > 180 => "1y",
        d if d > 90 => "6mo",
        _ => "3mo",
    }
}

#[derive(Debug, Deserialize)]
struct WireBar {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryResponse {
    Bars(Vec<WireBar>),
    Error { error: String },
}

fn into_fetch(symbol: &str, response: HistoryResponse) -> Result<BarFetch, TerminalError> {
    match response {
        HistoryResponse::Error { error } => Err(TerminalError::Fetch {
            symbol: symbol.to_string(),
            reason: error,
        }),
        HistoryResponse::Bars(wire) if wire.is_empty() => Ok(BarFetch::NoData),
        HistoryResponse::Bars(wire) => {
            let mut bars: Vec<Bar> = wire
                .into_iter()
                .map(|w| Bar {
                    time: w.time,
                    open: w.open,
                    high: w.high,
                    low: w.low,
                    close: w.close,
                    volume: w.volume.max(0.0) as u64,
                })
                .collect();
            bars.sort_by_key(|b| b.time);
            validate_series(&bars)?;
            Ok(BarFetch::Bars(bars))
        }
    }
}

#[async_trait]
impl BarPort for HttpBarAdapter {
    async fn fetch_bars(&self, request: &BarRequest) -> Result<BarFetch, TerminalError> {
        let fetch_error = |reason: String| TerminalError::Fetch {
            symbol: request.symbol.clone(),
            reason,
        };
        let url = format!("{}/history", self.base_url);
        let period = period_for(request.span_days());
        let interval = interval_for(request.resolution);
        debug!(symbol = %request.symbol, period, interval, "requesting history");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", request.symbol.as_str()),
                ("period", period),
                ("interval", interval),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(symbol = %request.symbol, "history service has no data");
            return Ok(BarFetch::NoData);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(symbol = %request.symbol, %status, "history request failed");
            return Err(fetch_error(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| fetch_error(format!("invalid history response: {}", e)))?;
        into_fetch(&request.symbol, body)
    }
}
