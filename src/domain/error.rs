//! Domain error types.

/// Outcome of a single widget call while switching symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("method not available on this widget")]
    Unsupported,

    #[error("{reason}")]
    Failed { reason: String },
}

/// Top-level error type for chartterm.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("chart widget not initialized")]
    WidgetNotInitialized,

    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("could not change symbol to {symbol}: every widget strategy failed")]
    SymbolChangeFailed { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("failed to fetch bars for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error("invalid bar series: {reason}")]
    InvalidBars { reason: String },

    #[error("unsupported resolution: {0}")]
    UnsupportedResolution(String),

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error("assistant error: {reason}")]
    Assistant { reason: String },

    #[error("preference store error: {reason}")]
    Preferences { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TerminalError> for std::process::ExitCode {
    fn from(err: &TerminalError) -> Self {
        let code: u8 = match err {
            TerminalError::Io(_) => 1,
            TerminalError::ConfigParse { .. }
            | TerminalError::ConfigMissing { .. }
            | TerminalError::ConfigInvalid { .. } => 2,
            TerminalError::NoData { .. }
            | TerminalError::InsufficientData { .. }
            | TerminalError::Fetch { .. }
            | TerminalError::InvalidBars { .. }
            | TerminalError::UnsupportedResolution(_) => 5,
            TerminalError::WidgetNotInitialized
            | TerminalError::EmptySymbol
            | TerminalError::SymbolChangeFailed { .. }
            | TerminalError::Render { .. } => 6,
            TerminalError::Assistant { .. } | TerminalError::Preferences { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
