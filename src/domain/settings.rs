//! Typed terminal settings read through [`ConfigPort`].

use std::path::PathBuf;

use crate::domain::config_validation::validate_terminal_config;
use crate::domain::error::TerminalError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_SYMBOL: &str = "AAPL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Csv,
    Http,
}

impl DataSource {
    pub fn default_for_build() -> Self {
        if cfg!(feature = "http") {
            DataSource::Http
        } else {
            DataSource::Csv
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub source: DataSource,
    pub base_url: String,
    pub csv_dir: PathBuf,
    pub lookback_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub symbol: String,
    pub width: f64,
    pub height: f64,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceSettings {
    pub path: Option<PathBuf>,
    pub onboarding: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data: DataSettings,
    pub chart: ChartSettings,
    pub assistant: AssistantSettings,
    pub preferences: PreferenceSettings,
    pub log: LogSettings,
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Validate and read every section, applying defaults for absent keys.
pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, TerminalError> {
    validate_terminal_config(config)?;

    let source = match config.get_string("data", "source") {
        Some(s) if s.trim().eq_ignore_ascii_case("http") => DataSource::Http,
        Some(s) if s.trim().eq_ignore_ascii_case("csv") => DataSource::Csv,
        _ => DataSource::default_for_build(),
    };

    Ok(Settings {
        data: DataSettings {
            source,
            base_url: string_or(config, "data", "base_url", DEFAULT_BASE_URL),
            csv_dir: config
                .get_path("data", "csv_dir")
                .unwrap_or_else(|| PathBuf::from("data")),
            lookback_days: config.get_int("data", "lookback_days", 90),
        },
        chart: ChartSettings {
            symbol: string_or(config, "chart", "symbol", DEFAULT_SYMBOL).to_uppercase(),
            width: config.get_int("chart", "width", 1200) as f64,
            height: config.get_int("chart", "height", 600) as f64,
            output: config.get_path("chart", "output"),
        },
        assistant: AssistantSettings {
            api_key: config
                .get_string("assistant", "api_key")
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            endpoint: string_or(config, "assistant", "endpoint", DEFAULT_ENDPOINT),
            model: string_or(config, "assistant", "model", DEFAULT_MODEL),
            max_tokens: u32::try_from(config.get_int("assistant", "max_tokens", 150)).map_err(
                |_| TerminalError::ConfigInvalid {
                    section: "assistant".into(),
                    key: "max_tokens".into(),
                    reason: "max_tokens is too large".into(),
                },
            )?,
        },
        preferences: PreferenceSettings {
            path: config.get_path("preferences", "path"),
            onboarding: config.get_bool("preferences", "onboarding", true),
        },
        log: LogSettings {
            level: string_or(config, "log", "level", "warn"),
            format: string_or(config, "log", "format", "pretty").to_lowercase(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn defaults_for_empty_config() {
        let settings = build_settings(&FileConfigAdapter::from_string("").unwrap()).unwrap();
        assert_eq!(settings.data.source, DataSource::default_for_build());
        assert_eq!(settings.data.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.data.csv_dir, PathBuf::from("data"));
        assert_eq!(settings.data.lookback_days, 90);
        assert_eq!(settings.chart.symbol, "AAPL");
        assert_eq!(settings.chart.width, 1200.0);
        assert_eq!(settings.chart.height, 600.0);
        assert!(settings.chart.output.is_none());
        assert!(settings.assistant.api_key.is_none());
        assert_eq!(settings.assistant.model, DEFAULT_MODEL);
        assert_eq!(settings.assistant.max_tokens, 150);
        assert!(settings.preferences.onboarding);
        assert_eq!(settings.log.level, "warn");
        assert_eq!(settings.log.format, "pretty");
    }

    #[test]
    fn reads_every_section() {
        let content = r#"
[data]
source = csv
base_url = http://quotes.local:8080
csv_dir = /tmp/bars
lookback_days = 120

[chart]
symbol = msft
width = 800
height = 400
output = chart.svg

[assistant]
api_key = sk-test
max_tokens = 64

[preferences]
path = prefs.csv
onboarding = false

[log]
level = debug
format = JSON
"#;
        let settings = build_settings(&FileConfigAdapter::from_string(content).unwrap()).unwrap();
        assert_eq!(settings.data.source, DataSource::Csv);
        assert_eq!(settings.data.base_url, "http://quotes.local:8080");
        assert_eq!(settings.data.csv_dir, PathBuf::from("/tmp/bars"));
        assert_eq!(settings.data.lookback_days, 120);
        assert_eq!(settings.chart.symbol, "MSFT");
        assert_eq!(settings.chart.output, Some(PathBuf::from("chart.svg")));
        assert_eq!(settings.assistant.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.assistant.max_tokens, 64);
        assert_eq!(settings.preferences.path, Some(PathBuf::from("prefs.csv")));
        assert!(!settings.preferences.onboarding);
        assert_eq!(settings.log.format, "json");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let adapter = FileConfigAdapter::from_string("[chart]\nwidth = -1\n").unwrap();
        assert!(matches!(
            build_settings(&adapter),
            Err(TerminalError::ConfigInvalid { .. })
        ));
    }
}
