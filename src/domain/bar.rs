//! OHLCV price bars, resolutions and fetch requests.

use crate::domain::error::TerminalError;
use std::fmt;
use std::str::FromStr;

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Unix seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Checks that times strictly increase and that no price is negative.
pub fn validate_series(bars: &[Bar]) -> Result<(), TerminalError> {
    for (i, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(TerminalError::InvalidBars {
                reason: format!("bar {} at {} has a negative or non-finite price", i, bar.time),
            });
        }
        if i > 0 && bar.time <= bars[i - 1].time {
            return Err(TerminalError::InvalidBars {
                reason: format!(
                    "bar {} at {} does not follow {}",
                    i,
                    bar.time,
                    bars[i - 1].time
                ),
            });
        }
    }
    Ok(())
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Minute60,
    Day,
    Week,
    Month,
}

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Resolution::Minute1,
        Resolution::Minute5,
        Resolution::Minute15,
        Resolution::Minute30,
        Resolution::Minute60,
        Resolution::Day,
        Resolution::Week,
        Resolution::Month,
    ];

    pub fn step_seconds(self) -> i64 {
        match self {
            Resolution::Minute1 => 60,
            Resolution::Minute5 => 300,
            Resolution::Minute15 => 900,
            Resolution::Minute30 => 1800,
            Resolution::Minute60 => 3600,
            Resolution::Day => 86_400,
            Resolution::Week => 604_800,
            Resolution::Month => 2_592_000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Minute1 => "1",
            Resolution::Minute5 => "5",
            Resolution::Minute15 => "15",
            Resolution::Minute30 => "30",
            Resolution::Minute60 => "60",
            Resolution::Day => "1D",
            Resolution::Week => "1W",
            Resolution::Month => "1M",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = TerminalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resolution::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| TerminalError::UnsupportedResolution(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarRequest {
    pub symbol: String,
    pub resolution: Resolution,
    pub from: i64,
    pub to: i64,
}

impl BarRequest {
    /// Daily bars covering the `days` leading up to `now`.
    pub fn trailing_days(symbol: &str, days: i64, now: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            resolution: Resolution::Day,
            from: now - days * SECONDS_PER_DAY,
            to: now,
        }
    }

    pub fn span_days(&self) -> i64 {
        ((self.to - self.from) as f64 / SECONDS_PER_DAY as f64).ceil() as i64
    }
}

/// A successful fetch either carries bars or reports that none exist.
#[derive(Debug, Clone, PartialEq)]
pub enum BarFetch {
    Bars(Vec<Bar>),
    NoData,
}

impl BarFetch {
    pub fn into_bars(self) -> Vec<Bar> {
        match self {
            BarFetch::Bars(bars) => bars,
            BarFetch::NoData => Vec::new(),
        }
    }
}
