//! CSV directory bar adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a `time,open,high,low,close,volume` header.
//! `time` is unix seconds or a `YYYY-MM-DD` date (midnight UTC).

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::domain::bar::{Bar, BarFetch, BarRequest, validate_series};
use crate::domain::error::TerminalError;
use crate::ports::bar_port::BarPort;

pub struct CsvBarAdapter {
    base_path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

fn parse_time(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Some(seconds);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn parse_bars(symbol: &str, content: &str) -> Result<Vec<Bar>, TerminalError> {
    let fetch_error = |reason: String| TerminalError::Fetch {
        symbol: symbol.to_string(),
        reason,
    };

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| fetch_error(format!("CSV parse error: {}", e)))?;
        let field = |index: usize, name: &str| {
            record
                .get(index)
                .map(str::trim)
                .ok_or_else(|| fetch_error(format!("row {}: missing {} column", row + 1, name)))
        };
        let price = |index: usize, name: &str| -> Result<f64, TerminalError> {
            field(index, name)?
                .parse()
                .map_err(|e| fetch_error(format!("row {}: invalid {} value: {}", row + 1, name, e)))
        };

        let time_str = field(0, "time")?;
        let time = parse_time(time_str)
            .ok_or_else(|| fetch_error(format!("row {}: invalid time '{}'", row + 1, time_str)))?;
        let volume = field(5, "volume")?
            .parse::<f64>()
            .map_err(|e| fetch_error(format!("row {}: invalid volume value: {}", row + 1, e)))?;

        bars.push(Bar {
            time,
            open: price(1, "open")?,
            high: price(2, "high")?,
            low: price(3, "low")?,
            close: price(4, "close")?,
            volume: volume.max(0.0) as u64,
        });
    }
    bars.sort_by_key(|b| b.time);
    Ok(bars)
}

#[async_trait]
impl BarPort for CsvBarAdapter {
    async fn fetch_bars(&self, request: &BarRequest) -> Result<BarFetch, TerminalError> {
        let path = self.csv_path(&request.symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no CSV file for symbol");
                return Ok(BarFetch::NoData);
            }
            Err(e) => {
                return Err(TerminalError::Fetch {
                    symbol: request.symbol.clone(),
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let bars: Vec<Bar> = parse_bars(&request.symbol, &content)?
            .into_iter()
            .filter(|b| b.time >= request.from && b.time <= request.to)
            .collect();
        validate_series(&bars)?;
        debug!(symbol = %request.symbol, bars = bars.len(), "bars loaded from CSV");

        if bars.is_empty() {
            Ok(BarFetch::NoData)
        } else {
            Ok(BarFetch::Bars(bars))
        }
    }
}
