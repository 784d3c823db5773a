//! External chart widget port.
//!
//! The widget is an opaque rendering component that only understands symbol
//! changes. Three entry points exist because real widgets expose different
//! subsets of them; callers escalate from the least to the most invasive.

use crate::domain::error::WidgetError;

pub trait ChartWidget {
    /// Direct widget-level symbol switch.
    fn set_symbol(&mut self, symbol: &str, interval: &str) -> Result<(), WidgetError>;

    /// Symbol switch through the widget's nested chart object.
    fn chart_set_symbol(&mut self, symbol: &str) -> Result<(), WidgetError>;

    /// Tear the widget down and build a new one showing `symbol`.
    fn recreate(&mut self, symbol: &str) -> Result<(), WidgetError>;
}
