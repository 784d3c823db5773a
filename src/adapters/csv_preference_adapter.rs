//! Stock preference stores: a CSV file and an in-memory list.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::TerminalError;
use crate::domain::preferences::StockPreference;
use crate::ports::preference_port::PreferencePort;

/// Preferences persisted as `symbol,name,category` rows, in selection order.
pub struct CsvPreferenceAdapter {
    path: PathBuf,
}

impl CsvPreferenceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn preference_error(reason: String) -> TerminalError {
    TerminalError::Preferences { reason }
}

impl PreferencePort for CsvPreferenceAdapter {
    fn load(&self) -> Result<Vec<StockPreference>, TerminalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&self.path)
            .map_err(|e| preference_error(format!("failed to open {}: {}", self.path.display(), e)))?;
        rdr.deserialize()
            .map(|row| row.map_err(|e| preference_error(format!("invalid preference row: {}", e))))
            .collect()
    }

    fn save(&mut self, preferences: &[StockPreference]) -> Result<(), TerminalError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(&self.path)
            .map_err(|e| preference_error(format!("failed to create {}: {}", self.path.display(), e)))?;
        for preference in preferences {
            wtr.serialize(preference)
                .map_err(|e| preference_error(format!("failed to write preference: {}", e)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TerminalError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    preferences: Vec<StockPreference>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(preferences: Vec<StockPreference>) -> Self {
        Self { preferences }
    }
}

impl PreferencePort for InMemoryPreferences {
    fn load(&self) -> Result<Vec<StockPreference>, TerminalError> {
        Ok(self.preferences.clone())
    }

    fn save(&mut self, preferences: &[StockPreference]) -> Result<(), TerminalError> {
        self.preferences = preferences.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TerminalError> {
        self.preferences.clear();
        Ok(())
    }
}
