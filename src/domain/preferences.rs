//! Stock preference catalog and selection parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::TerminalError;

/// Fewest distinct stocks accepted during onboarding.
pub const MIN_SELECTION: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockCategory {
    Tech,
    Ai,
    Semiconductor,
    Cloud,
    Social,
    Ecommerce,
}

impl StockCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            StockCategory::Tech => "tech",
            StockCategory::Ai => "ai",
            StockCategory::Semiconductor => "semiconductor",
            StockCategory::Cloud => "cloud",
            StockCategory::Social => "social",
            StockCategory::Ecommerce => "ecommerce",
        }
    }
}

impl fmt::Display for StockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockCategory {
    type Err = TerminalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tech" => Ok(StockCategory::Tech),
            "ai" => Ok(StockCategory::Ai),
            "semiconductor" => Ok(StockCategory::Semiconductor),
            "cloud" => Ok(StockCategory::Cloud),
            "social" => Ok(StockCategory::Social),
            "ecommerce" => Ok(StockCategory::Ecommerce),
            other => Err(TerminalError::Preferences {
                reason: format!("unknown stock category '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPreference {
    pub symbol: String,
    pub name: String,
    pub category: StockCategory,
}

pub const TECH_STOCKS: [(&str, &str, StockCategory); 20] = [
    ("AAPL", "Apple Inc.", StockCategory::Tech),
    ("MSFT", "Microsoft Corporation", StockCategory::Tech),
    ("GOOGL", "Alphabet Inc.", StockCategory::Tech),
    ("AMZN", "Amazon.com Inc.", StockCategory::Ecommerce),
    ("TSLA", "Tesla Inc.", StockCategory::Tech),
    ("META", "Meta Platforms Inc.", StockCategory::Social),
    ("NVDA", "NVIDIA Corporation", StockCategory::Ai),
    ("AMD", "Advanced Micro Devices", StockCategory::Semiconductor),
    ("INTC", "Intel Corporation", StockCategory::Semiconductor),
    ("NFLX", "Netflix Inc.", StockCategory::Tech),
    ("CRM", "Salesforce Inc.", StockCategory::Cloud),
    ("ORCL", "Oracle Corporation", StockCategory::Cloud),
    ("ADBE", "Adobe Inc.", StockCategory::Tech),
    ("NOW", "ServiceNow Inc.", StockCategory::Cloud),
    ("SHOP", "Shopify Inc.", StockCategory::Ecommerce),
    ("SQ", "Block Inc.", StockCategory::Tech),
    ("UBER", "Uber Technologies", StockCategory::Tech),
    ("SPOT", "Spotify Technology", StockCategory::Tech),
    ("ZOOM", "Zoom Video Communications", StockCategory::Tech),
    ("SNOW", "Snowflake Inc.", StockCategory::Cloud),
];

pub fn catalog() -> Vec<StockPreference> {
    TECH_STOCKS
        .iter()
        .map(|&(symbol, name, category)| StockPreference {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category,
        })
        .collect()
}

pub fn find_in_catalog(symbol: &str) -> Option<StockPreference> {
    let symbol = symbol.trim().to_uppercase();
    catalog().into_iter().find(|s| s.symbol == symbol)
}

/// Parse an onboarding selection such as `1, 3 NVDA`.
///
/// Tokens are 1-based catalog numbers or tickers, separated by commas and/or
/// whitespace. Duplicates are ignored; the first occurrence keeps its place.
pub fn parse_selection(input: &str) -> Result<Vec<StockPreference>, TerminalError> {
    let stocks = catalog();
    let mut selected: Vec<StockPreference> = Vec::new();

    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let stock = match token.parse::<usize>() {
            Ok(n) if (1..=stocks.len()).contains(&n) => stocks[n - 1].clone(),
            Ok(n) => {
                return Err(TerminalError::Preferences {
                    reason: format!("no stock number {} (choose 1-{})", n, stocks.len()),
                });
            }
            Err(_) => find_in_catalog(token).ok_or_else(|| TerminalError::Preferences {
                reason: format!("unknown stock '{}'", token),
            })?,
        };
        if !selected.iter().any(|s| s.symbol == stock.symbol) {
            selected.push(stock);
        }
    }

    if selected.len() < MIN_SELECTION {
        return Err(TerminalError::Preferences {
            reason: format!(
                "select at least {} stocks ({} selected)",
                MIN_SELECTION,
                selected.len()
            ),
        });
    }
    Ok(selected)
}
