//! Configuration validation.
//!
//! Validates every terminal config field before a session is built. Absent
//! keys fall back to their defaults and are therefore valid.

use crate::domain::error::TerminalError;
use crate::ports::config_port::ConfigPort;

pub const DATA_SOURCES: [&str; 2] = ["csv", "http"];
pub const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

pub fn validate_terminal_config(config: &dyn ConfigPort) -> Result<(), TerminalError> {
    validate_source(config)?;
    validate_positive(config, "data", "lookback_days")?;
    validate_symbol(config)?;
    validate_positive(config, "chart", "width")?;
    validate_positive(config, "chart", "height")?;
    validate_positive(config, "assistant", "max_tokens")?;
    validate_log_format(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TerminalError {
    TerminalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), TerminalError> {
    match config.get_string("data", "source") {
        Some(source) if !DATA_SOURCES.contains(&source.trim().to_lowercase().as_str()) => Err(
            invalid("data", "source", format!("source must be one of {:?}", DATA_SOURCES)),
        ),
        _ => Ok(()),
    }
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TerminalError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => Ok(()),
        Ok(_) => Err(invalid(section, key, format!("{} must be positive", key))),
        Err(_) => Err(invalid(section, key, format!("{} must be an integer", key))),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), TerminalError> {
    match config.get_string("chart", "symbol") {
        Some(symbol) if symbol.trim().is_empty() => {
            Err(invalid("chart", "symbol", "symbol must not be empty"))
        }
        Some(symbol) if !symbol.trim().chars().all(|c| c.is_ascii_alphabetic()) => Err(invalid(
            "chart",
            "symbol",
            "symbol must contain only ASCII letters",
        )),
        _ => Ok(()),
    }
}

fn validate_log_format(config: &dyn ConfigPort) -> Result<(), TerminalError> {
    match config.get_string("log", "format") {
        Some(format) if !LOG_FORMATS.contains(&format.trim().to_lowercase().as_str()) => Err(
            invalid("log", "format", format!("format must be one of {:?}", LOG_FORMATS)),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(content: &str) -> Option<String> {
        match validate_terminal_config(&make_config(content)) {
            Err(TerminalError::ConfigInvalid { key, .. }) => Some(key),
            _ => None,
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_terminal_config(&make_config("")).is_ok());
    }

    #[test]
    fn full_config_is_valid() {
        let content = r#"
[data]
source = csv
csv_dir = data
lookback_days = 90

[chart]
symbol = AAPL
width = 1200
height = 600

[assistant]
max_tokens = 150

[log]
level = debug
format = json
"#;
        assert!(validate_terminal_config(&make_config(content)).is_ok());
    }

    #[test]
    fn unknown_source_fails() {
        assert_eq!(
            invalid_key("[data]\nsource = ftp\n").as_deref(),
            Some("source")
        );
    }

    #[test]
    fn non_positive_sizes_fail() {
        assert_eq!(invalid_key("[chart]\nwidth = 0\n").as_deref(), Some("width"));
        assert_eq!(invalid_key("[chart]\nheight = -5\n").as_deref(), Some("height"));
        assert_eq!(
            invalid_key("[data]\nlookback_days = abc\n").as_deref(),
            Some("lookback_days")
        );
        assert_eq!(
            invalid_key("[assistant]\nmax_tokens = 0\n").as_deref(),
            Some("max_tokens")
        );
    }

    #[test]
    fn symbol_with_punctuation_fails() {
        assert_eq!(invalid_key("[chart]\nsymbol = BRK.B\n").as_deref(), Some("symbol"));
    }

    #[test]
    fn unknown_log_format_fails() {
        assert_eq!(invalid_key("[log]\nformat = xml\n").as_deref(), Some("format"));
    }
}
