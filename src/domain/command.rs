//! Typed terminal commands produced by the command parser.

use std::fmt;

pub const DEFAULT_LINE_COLOR: &str = "#2196F3";
pub const SUPPORT_COLOR: &str = "#4CAF50";
pub const RESISTANCE_COLOR: &str = "#F44336";
pub const VERTICAL_LINE_COLOR: &str = "#FF9800";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaType {
    Sma,
    Ema,
}

impl MaType {
    pub fn default_color(self) -> &'static str {
        match self {
            MaType::Sma => "#FFA500",
            MaType::Ema => "#FF6600",
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaType::Sma => write!(f, "SMA"),
            MaType::Ema => write!(f, "EMA"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    HorizontalLine { price: f64, color: Option<String> },
    VerticalLine { time: i64 },
    Clear,
    Symbol { symbol: String },
    MovingAverage { period: usize, ma_type: MaType },
    Fibonacci { start_price: f64, end_price: f64 },
    BollingerBands { period: usize },
    Help,
    Ask { query: String },
    SetKey { key: String },
}

impl Command {
    /// Stable tag naming the command variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::HorizontalLine { .. } => "horizontal_line",
            Command::VerticalLine { .. } => "vertical_line",
            Command::Clear => "clear",
            Command::Symbol { .. } => "symbol",
            Command::MovingAverage { .. } => "moving_average",
            Command::Fibonacci { .. } => "fibonacci",
            Command::BollingerBands { .. } => "bollinger_bands",
            Command::Help => "help",
            Command::Ask { .. } => "ask",
            Command::SetKey { .. } => "setkey",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::HorizontalLine { price, color } => match color {
                Some(c) => write!(f, "horizontal_line(price={}, color={})", price, c),
                None => write!(f, "horizontal_line(price={})", price),
            },
            Command::VerticalLine { time } => write!(f, "vertical_line(time={})", time),
            Command::Clear => write!(f, "clear"),
            Command::Symbol { symbol } => write!(f, "symbol({})", symbol),
            Command::MovingAverage { period, ma_type } => {
                write!(f, "moving_average({}({}))", ma_type, period)
            }
            Command::Fibonacci {
                start_price,
                end_price,
            } => write!(f, "fibonacci({} -> {})", start_price, end_price),
            Command::BollingerBands { period } => write!(f, "bollinger_bands({})", period),
            Command::Help => write!(f, "help"),
            Command::Ask { query } => write!(f, "ask({:?})", query),
            // The key itself is never echoed.
            Command::SetKey { .. } => write!(f, "setkey(****)"),
        }
    }
}
