//! Symbol qualification and widget escalation strategies.

use std::fmt;

use crate::domain::error::WidgetError;
use crate::ports::widget_port::ChartWidget;

pub const DEFAULT_INTERVAL: &str = "1D";

pub const NASDAQ_SYMBOLS: [&str; 11] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "AMD", "INTC", "NFLX", "ADBE",
];

pub const NYSE_SYMBOLS: [&str; 9] = [
    "CRM", "ORCL", "NOW", "SHOP", "SQ", "UBER", "SPOT", "ZOOM", "SNOW",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Nasdaq,
    Nyse,
}

impl Exchange {
    /// Listing exchange for an uppercased ticker. Unknown tickers default to NASDAQ.
    pub fn for_symbol(symbol: &str) -> Self {
        if NYSE_SYMBOLS.contains(&symbol) {
            Exchange::Nyse
        } else {
            Exchange::Nasdaq
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Nyse => "NYSE",
        }
    }
}

/// `EXCHANGE:SYMBOL` form understood by the widget.
pub fn qualify(symbol: &str) -> String {
    format!("{}:{}", Exchange::for_symbol(symbol).as_str(), symbol)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolChangeStrategy {
    DirectSetSymbol,
    ChartApiSetSymbol,
    RecreateWidget,
}

/// Tried in order, least invasive first.
pub const STRATEGIES: [SymbolChangeStrategy; 3] = [
    SymbolChangeStrategy::DirectSetSymbol,
    SymbolChangeStrategy::ChartApiSetSymbol,
    SymbolChangeStrategy::RecreateWidget,
];

impl SymbolChangeStrategy {
    pub fn apply(self, widget: &mut dyn ChartWidget, qualified: &str) -> Result<(), WidgetError> {
        match self {
            SymbolChangeStrategy::DirectSetSymbol => widget.set_symbol(qualified, DEFAULT_INTERVAL),
            SymbolChangeStrategy::ChartApiSetSymbol => widget.chart_set_symbol(qualified),
            SymbolChangeStrategy::RecreateWidget => widget.recreate(qualified),
        }
    }
}

impl fmt::Display for SymbolChangeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolChangeStrategy::DirectSetSymbol => "set_symbol",
            SymbolChangeStrategy::ChartApiSetSymbol => "chart().set_symbol",
            SymbolChangeStrategy::RecreateWidget => "recreate",
        };
        f.write_str(name)
    }
}
