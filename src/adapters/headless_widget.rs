//! Chart widget without a display.
//!
//! Records the symbol it was last asked to show. Used by the CLI, where the
//! rendered chart is the SVG surface rather than an embedded widget.

use tracing::debug;

use crate::domain::error::WidgetError;
use crate::ports::widget_port::ChartWidget;

#[derive(Debug, Default)]
pub struct HeadlessWidget {
    symbol: Option<String>,
    interval: Option<String>,
}

impl HeadlessWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualified symbol currently shown, e.g. `NASDAQ:AAPL`.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn interval(&self) -> Option<&str> {
        self.interval.as_deref()
    }
}

impl ChartWidget for HeadlessWidget {
    fn set_symbol(&mut self, symbol: &str, interval: &str) -> Result<(), WidgetError> {
        debug!(symbol, interval, "headless widget symbol set");
        self.symbol = Some(symbol.to_string());
        self.interval = Some(interval.to_string());
        Ok(())
    }

    fn chart_set_symbol(&mut self, symbol: &str) -> Result<(), WidgetError> {
        self.symbol = Some(symbol.to_string());
        Ok(())
    }

    fn recreate(&mut self, symbol: &str) -> Result<(), WidgetError> {
        *self = Self {
            symbol: Some(symbol.to_string()),
            interval: None,
        };
        Ok(())
    }
}
