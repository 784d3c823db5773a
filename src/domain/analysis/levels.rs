//! Support/resistance clustering and key-level analysis.
//!
//! Prices are bucketed to the nearest whole dollar. Each low (or high) adds
//! `ln(volume)` to its bucket, or 1 when volume is zero; each close adds half
//! of that. The three highest-scoring buckets win, ties keeping the order in
//! which buckets were first seen.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::analysis::fibonacci::{FibonacciLevels, fibonacci_levels};
use crate::domain::analysis::moving_average::{last_value, sma};
use crate::domain::bar::{Bar, BarRequest, closes};
use crate::domain::error::TerminalError;
use crate::ports::bar_port::BarPort;

pub const LOOKBACK_DAYS: i64 = 90;
pub const MIN_BARS: usize = 20;
pub const SWING_BARS: usize = 30;
const MAX_LEVELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverages {
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyLevels {
    pub symbol: String,
    pub current_price: f64,
    /// Ascending.
    pub support: Vec<f64>,
    /// Descending.
    pub resistance: Vec<f64>,
    pub fibonacci: FibonacciLevels,
    pub moving_averages: MovingAverages,
    pub price_range: PriceRange,
}

fn volume_weight(volume: u64) -> f64 {
    if volume > 0 { (volume as f64).ln() } else { 1.0 }
}

#[derive(Default)]
struct Buckets {
    order: Vec<(i64, f64)>,
    index: HashMap<i64, usize>,
}

impl Buckets {
    fn add(&mut self, price: f64, weight: f64) {
        let key = price.round() as i64;
        match self.index.get(&key) {
            Some(&i) => self.order[i].1 += weight,
            None => {
                self.index.insert(key, self.order.len());
                self.order.push((key, weight));
            }
        }
    }

    fn top(mut self) -> Vec<f64> {
        // sort_by is stable, so equal scores keep first-seen order
        self.order.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.order
            .into_iter()
            .take(MAX_LEVELS)
            .map(|(price, _)| price as f64)
            .collect()
    }
}

fn cluster(extremes: impl Iterator<Item = f64>, bars: &[Bar]) -> Vec<f64> {
    let mut buckets = Buckets::default();
    for (price, bar) in extremes.zip(bars) {
        buckets.add(price, volume_weight(bar.volume));
    }
    for bar in bars {
        buckets.add(bar.close, volume_weight(bar.volume) * 0.5);
    }
    buckets.top()
}

pub fn support_levels(bars: &[Bar]) -> Vec<f64> {
    let mut levels = cluster(bars.iter().map(|b| b.low), bars);
    levels.sort_by(f64::total_cmp);
    levels
}

pub fn resistance_levels(bars: &[Bar]) -> Vec<f64> {
    let mut levels = cluster(bars.iter().map(|b| b.high), bars);
    levels.sort_by(|a, b| b.total_cmp(a));
    levels
}

/// Key levels from bars already fetched. Fails below [`MIN_BARS`].
pub fn key_levels_from_bars(symbol: &str, bars: &[Bar]) -> Result<KeyLevels, TerminalError> {
    let last = match bars.last() {
        Some(bar) if bars.len() >= MIN_BARS => bar,
        _ => {
            return Err(TerminalError::InsufficientData {
                symbol: symbol.to_string(),
                bars: bars.len(),
                minimum: MIN_BARS,
            });
        }
    };

    let swing = &bars[bars.len().saturating_sub(SWING_BARS)..];
    let high = swing.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = swing.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    let closes = closes(bars);
    Ok(KeyLevels {
        symbol: symbol.to_string(),
        current_price: last.close,
        support: support_levels(bars),
        resistance: resistance_levels(bars),
        fibonacci: fibonacci_levels(low, high),
        moving_averages: MovingAverages {
            ma20: last_value(&sma(&closes, 20)),
            ma50: last_value(&sma(&closes, 50)),
        },
        price_range: PriceRange { high, low },
    })
}

/// Fetch ~90 days of daily bars for `symbol` and compute its key levels.
pub async fn find_key_levels(
    bars: &dyn BarPort,
    symbol: &str,
    now: i64,
) -> Result<KeyLevels, TerminalError> {
    let request = BarRequest::trailing_days(symbol, LOOKBACK_DAYS, now);
    debug!(symbol, from = request.from, to = request.to, "fetching bars for key levels");
    let series = bars.fetch_bars(&request).await?.into_bars();
    let levels = key_levels_from_bars(symbol, &series)?;
    info!(
        symbol,
        bars = series.len(),
        support = ?levels.support,
        resistance = ?levels.resistance,
        "key levels computed"
    );
    Ok(levels)
}

/// Terminal commands that would draw the most relevant key levels.
pub fn generate_commands(levels: &KeyLevels) -> Vec<String> {
    let mut commands = Vec::new();
    for price in levels.support.iter().take(2) {
        commands.push(format!("support {:.0}", price));
    }
    for price in levels.resistance.iter().take(2) {
        commands.push(format!("resistance {:.0}", price));
    }
    commands.push(format!(
        "fib {:.0} {:.0}",
        levels.price_range.low, levels.price_range.high
    ));
    if let Some(ma20) = levels.moving_averages.ma20 {
        commands.push(format!("hline {:.0}", ma20));
    }
    commands
}
