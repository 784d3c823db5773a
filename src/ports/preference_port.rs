//! Saved stock preference storage port.

use crate::domain::error::TerminalError;
use crate::domain::preferences::StockPreference;

pub trait PreferencePort {
    fn load(&self) -> Result<Vec<StockPreference>, TerminalError>;
    fn save(&mut self, preferences: &[StockPreference]) -> Result<(), TerminalError>;
    fn clear(&mut self) -> Result<(), TerminalError>;
}
