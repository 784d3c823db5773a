//! Terminal session: history, built-ins, command dispatch and the output log.

use tracing::{debug, info, warn};

use crate::domain::analysis::{KeyLevels, find_key_levels, generate_commands};
use crate::domain::assistant::{Assistant, SuggestionSource};
use crate::domain::command::{Command, DEFAULT_LINE_COLOR, VERTICAL_LINE_COLOR};
use crate::domain::command_parser::{help_text, parse_at};
use crate::domain::error::TerminalError;
use crate::domain::history::{CommandHistory, HistoryStep};
use crate::domain::overlay_manager::OverlayManager;
use crate::domain::preferences::{MIN_SELECTION, StockPreference, catalog, parse_selection};
use crate::ports::preference_port::PreferencePort;
use crate::ports::surface_port::ChartSurface;

pub const PROMPT: &str = "user@stock-terminal:~$";
pub const BANNER: &str = "TradingView Stock Chart Terminal v1.0.0";
pub const HELP_HINT: &str = "Type 'help' for available commands";
const HISTORY_SHOWN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Plain,
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputLine {
    pub fn new(kind: OutputKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Lines produced by one submit. `cleared` is set when the log was wiped
/// before these lines were written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitOutcome {
    pub cleared: bool,
    pub lines: Vec<OutputLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Terminal,
    Onboarding,
}

pub struct Session<S: ChartSurface> {
    chart: OverlayManager<S>,
    assistant: Assistant,
    preferences: Box<dyn PreferencePort>,
    history: CommandHistory,
    log: Vec<OutputLine>,
    pending: SubmitOutcome,
    mode: SessionMode,
}

impl<S: ChartSurface> Session<S> {
    pub fn new(
        chart: OverlayManager<S>,
        assistant: Assistant,
        preferences: Box<dyn PreferencePort>,
    ) -> Self {
        let mut session = Self {
            chart,
            assistant,
            preferences,
            history: CommandHistory::new(),
            log: Vec::new(),
            pending: SubmitOutcome::default(),
            mode: SessionMode::Terminal,
        };
        session.banner();
        session.pending = SubmitOutcome::default();
        session
    }

    /// Load saved preferences and, when none exist and `onboarding` is set,
    /// switch to onboarding mode.
    pub fn start(&mut self, onboarding: bool) -> SubmitOutcome {
        self.pending = SubmitOutcome::default();
        match self.preferences.load() {
            Ok(saved) if saved.is_empty() && onboarding => self.enter_onboarding(),
            Ok(saved) if !saved.is_empty() => {
                let symbols: Vec<&str> = saved.iter().map(|s| s.symbol.as_str()).collect();
                self.emit(
                    OutputKind::Info,
                    format!("Your stocks: {} (type 'stocks' to list)", symbols.join(", ")),
                );
            }
            Ok(_) => {}
            Err(e) => self.emit(OutputKind::Error, format!("✗ {}", e)),
        }
        std::mem::take(&mut self.pending)
    }

    pub fn chart(&self) -> &OverlayManager<S> {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut OverlayManager<S> {
        &mut self.chart
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn log(&self) -> &[OutputLine] {
        &self.log
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Arrow-key navigation; returns the text for the input line.
    pub fn navigate_history(&mut self, step: HistoryStep) -> Option<String> {
        self.history.navigate(step).map(str::to_string)
    }

    fn emit(&mut self, kind: OutputKind, text: impl Into<String>) {
        let line = OutputLine::new(kind, text);
        self.log.push(line.clone());
        self.pending.lines.push(line);
    }

    fn success(&mut self, text: impl Into<String>) {
        self.emit(OutputKind::Success, format!("✓ {}", text.into()));
    }

    fn failure(&mut self, err: &TerminalError) {
        self.emit(OutputKind::Error, format!("✗ {}", err));
    }

    fn banner(&mut self) {
        self.emit(OutputKind::Info, BANNER);
        self.emit(OutputKind::Plain, HELP_HINT);
    }

    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        self.pending = SubmitOutcome::default();
        let trimmed = input.trim();
        self.history.reset_cursor();

        if trimmed.is_empty() {
            self.emit(OutputKind::Plain, format!("{} ", PROMPT));
            return std::mem::take(&mut self.pending);
        }

        self.emit(OutputKind::Plain, format!("{} {}", PROMPT, trimmed));
        self.history.push(trimmed);
        if self.mode == SessionMode::Onboarding {
            self.onboarding_selection(trimmed);
            return std::mem::take(&mut self.pending);
        }

        if !self.run_builtin(trimmed).await {
            match parse_at(trimmed, self.chart.now()) {
                Some(command) => self.dispatch(command).await,
                None => {
                    debug!(input = trimmed, "unrecognised command");
                    self.emit(
                        OutputKind::Error,
                        format!("bash: {}: command not found", trimmed),
                    );
                    self.emit(OutputKind::Plain, HELP_HINT);
                }
            }
        }
        std::mem::take(&mut self.pending)
    }

    /// Session-level commands checked before the grammar. Returns `true` when
    /// the input was handled.
    async fn run_builtin(&mut self, input: &str) -> bool {
        let lower = input.to_lowercase();
        match lower.as_str() {
            "clear" | "cls" => {
                self.log.clear();
                self.pending = SubmitOutcome {
                    cleared: true,
                    lines: Vec::new(),
                };
                self.chart.clear_all_shapes();
                self.banner();
                self.success("Cleared terminal and all chart overlays");
            }
            "history" => self.show_history(),
            "stocks" | "preferences" => self.show_preferences(),
            "reset" | "setup" => match self.preferences.clear() {
                Ok(()) => {
                    info!("stock preferences cleared");
                    self.success("Cleared stock preferences");
                    self.enter_onboarding();
                }
                Err(e) => self.failure(&e),
            },
            "analyze" | "levels" => self.analyze().await,
            _ => match lower
                .strip_prefix("stock")
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(str::trim)
                .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
            {
                Some(number) => self.switch_to_preference(number),
                None => return false,
            },
        }
        true
    }

    async fn dispatch(&mut self, command: Command) {
        debug!(command = %command, "dispatching");
        match command {
            Command::HorizontalLine { price, color } => {
                let color = color.as_deref().unwrap_or(DEFAULT_LINE_COLOR);
                match self.chart.add_horizontal_line(price, color) {
                    Ok(_) => self.success(format!("Added horizontal line at ${}", price)),
                    Err(e) => self.failure(&e),
                }
            }
            Command::VerticalLine { time } => {
                match self.chart.add_vertical_line(time, VERTICAL_LINE_COLOR) {
                    Ok(_) => self.success("Added vertical line at current time"),
                    Err(e) => self.failure(&e),
                }
            }
            Command::Clear => {
                self.chart.clear_all_shapes();
                self.success("Cleared all lines and shapes");
            }
            Command::Symbol { symbol } => self.change_symbol(&symbol),
            Command::MovingAverage { period, ma_type } => {
                match self.chart.add_moving_average(period, ma_type, None).await {
                    Ok(Some(_)) => {
                        self.success(format!("Added {}({}) moving average", ma_type, period))
                    }
                    Ok(None) => self.not_enough_data(&format!("{}({})", ma_type, period)),
                    Err(e) => self.failure(&e),
                }
            }
            Command::Fibonacci {
                start_price,
                end_price,
            } => match self.chart.add_fibonacci_retracement(start_price, end_price) {
                Ok(_) => self.success(format!(
                    "Added Fibonacci retracement from ${} to ${}",
                    start_price, end_price
                )),
                Err(e) => self.failure(&e),
            },
            Command::BollingerBands { period } => {
                match self.chart.add_bollinger_bands(period).await {
                    Ok(Some(_)) => self.success(format!("Added Bollinger Bands({})", period)),
                    Ok(None) => self.not_enough_data(&format!("Bollinger Bands({})", period)),
                    Err(e) => self.failure(&e),
                }
            }
            Command::Help => self.show_help(),
            Command::Ask { query } => self.ask(&query).await,
            Command::SetKey { key } => {
                self.assistant.set_api_key(&key);
                self.success("API key saved");
                if !self.assistant.has_model() {
                    self.emit(
                        OutputKind::Info,
                        "No language model is configured; suggestions stay local",
                    );
                }
            }
        }
    }

    fn not_enough_data(&mut self, what: &str) {
        let symbol = self.chart.current_symbol().to_string();
        self.emit(
            OutputKind::Error,
            format!("✗ Not enough data for {} on {}: nothing drawn", what, symbol),
        );
    }

    fn change_symbol(&mut self, symbol: &str) {
        match self.chart.change_symbol(symbol) {
            Ok(_) => {
                let current = self.chart.current_symbol().to_string();
                self.success(format!("Changed symbol to {}", current));
            }
            Err(e) => self.failure(&e),
        }
    }

    fn show_help(&mut self) {
        for line in help_text().lines() {
            let kind = if line.ends_with(':') {
                OutputKind::Info
            } else {
                OutputKind::Plain
            };
            self.emit(kind, line);
        }
    }

    fn show_history(&mut self) {
        self.emit(OutputKind::Info, "Command History:");
        let lines: Vec<String> = self
            .history
            .recent(HISTORY_SHOWN)
            .into_iter()
            .map(|(ordinal, cmd)| format!("  {}: {}", ordinal, cmd))
            .collect();
        if lines.is_empty() {
            self.emit(OutputKind::Plain, "  No commands in history");
        }
        for line in lines {
            self.emit(OutputKind::Plain, line);
        }
    }

    fn load_preferences(&mut self) -> Option<Vec<StockPreference>> {
        match self.preferences.load() {
            Ok(saved) => Some(saved),
            Err(e) => {
                self.failure(&e);
                None
            }
        }
    }

    fn show_preferences(&mut self) {
        let Some(saved) = self.load_preferences() else {
            return;
        };
        if saved.is_empty() {
            self.emit(
                OutputKind::Plain,
                "No stock preferences saved. Type 'reset' to choose stocks",
            );
            return;
        }
        self.emit(OutputKind::Info, "Your Stock Preferences:");
        for (i, stock) in saved.iter().enumerate() {
            self.emit(
                OutputKind::Plain,
                format!("  {}. {} - {} ({})", i + 1, stock.symbol, stock.name, stock.category),
            );
        }
        self.emit(OutputKind::Plain, "Type 'stock <number>' to switch");
    }

    fn switch_to_preference(&mut self, number: &str) {
        let Some(saved) = self.load_preferences() else {
            return;
        };
        let index = number.parse::<usize>().ok().filter(|n| *n >= 1 && *n <= saved.len());
        match index {
            Some(n) => {
                let symbol = saved[n - 1].symbol.clone();
                self.change_symbol(&symbol);
            }
            None => self.emit(
                OutputKind::Error,
                format!(
                    "✗ No stock #{} in your preferences (you have {})",
                    number,
                    saved.len()
                ),
            ),
        }
    }

    async fn analyze(&mut self) {
        let symbol = self.chart.current_symbol().to_string();
        self.emit(OutputKind::Info, format!("Analyzing {}...", symbol));
        let result = find_key_levels(self.chart.bar_port(), &symbol, self.chart.now()).await;
        match result {
            Ok(levels) => self.show_key_levels(&levels),
            Err(e) => self.failure(&e),
        }
    }

    fn show_key_levels(&mut self, levels: &KeyLevels) {
        for line in key_level_lines(levels) {
            self.log.push(line.clone());
            self.pending.lines.push(line);
        }
    }

    async fn ask(&mut self, query: &str) {
        let (suggestions, source) = self.assistant.suggest(query).await;
        let header = match source {
            SuggestionSource::Local => "Suggested commands:",
            SuggestionSource::Model => "Suggested commands (language model):",
        };
        self.emit(OutputKind::Info, header);
        for suggestion in suggestions {
            self.emit(OutputKind::Plain, format!("  {}", suggestion));
        }
    }

    fn enter_onboarding(&mut self) {
        self.mode = SessionMode::Onboarding;
        info!("entering onboarding");
        self.emit(
            OutputKind::Info,
            format!("Choose at least {} stocks to follow:", MIN_SELECTION),
        );
        for (i, stock) in catalog().iter().enumerate() {
            self.emit(
                OutputKind::Plain,
                format!(
                    "  {:>2}. {:<6} {} [{}]",
                    i + 1,
                    stock.symbol,
                    stock.name,
                    stock.category
                ),
            );
        }
        self.emit(
            OutputKind::Plain,
            "Enter numbers or tickers separated by commas or spaces (e.g. 1, 7, AMD)",
        );
    }

    fn onboarding_selection(&mut self, input: &str) {
        let selected = match parse_selection(input) {
            Ok(selected) => selected,
            Err(e) => {
                self.failure(&e);
                return;
            }
        };
        if let Err(e) = self.preferences.save(&selected) {
            warn!(error = %e, "could not save stock preferences");
            self.failure(&e);
            return;
        }

        let symbols: Vec<&str> = selected.iter().map(|s| s.symbol.as_str()).collect();
        self.success(format!(
            "Saved {} stock preferences: {}",
            selected.len(),
            symbols.join(", ")
        ));
        self.mode = SessionMode::Terminal;
        let first = selected[0].symbol.clone();
        self.change_symbol(&first);
    }
}

/// Report lines for computed key levels, ending with the suggested commands.
pub fn key_level_lines(levels: &KeyLevels) -> Vec<OutputLine> {
    let dollars = |prices: &[f64]| {
        if prices.is_empty() {
            "none".to_string()
        } else {
            prices
                .iter()
                .map(|p| format!("${:.0}", p))
                .collect::<Vec<_>>()
                .join(", ")
        }
    };
    let optional = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("${:.2}", v));
    let fib: Vec<String> = levels
        .fibonacci
        .iter()
        .map(|l| format!("{:.1}% ${:.2}", l.ratio * 100.0, l.price))
        .collect();

    let mut lines = vec![
        OutputLine::new(
            OutputKind::Info,
            format!(
                "Key levels for {} (current ${:.2}):",
                levels.symbol, levels.current_price
            ),
        ),
        OutputLine::new(OutputKind::Plain, format!("  Support: {}", dollars(&levels.support))),
        OutputLine::new(
            OutputKind::Plain,
            format!("  Resistance: {}", dollars(&levels.resistance)),
        ),
        OutputLine::new(OutputKind::Plain, format!("  Fibonacci: {}", fib.join(" | "))),
        OutputLine::new(
            OutputKind::Plain,
            format!(
                "  MA20: {}  MA50: {}",
                optional(levels.moving_averages.ma20),
                optional(levels.moving_averages.ma50)
            ),
        ),
        OutputLine::new(OutputKind::Info, "Suggested commands:"),
    ];
    lines.extend(
        generate_commands(levels)
            .into_iter()
            .map(|command| OutputLine::new(OutputKind::Plain, format!("  {}", command))),
    );
    lines
}
