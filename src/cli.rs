//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::csv_preference_adapter::{CsvPreferenceAdapter, InMemoryPreferences};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::headless_widget::HeadlessWidget;
use crate::adapters::svg_surface::SvgSurface;
use crate::domain::analysis::find_key_levels;
use crate::domain::assistant::Assistant;
use crate::domain::bar::unix_now;
use crate::domain::command_parser::parse;
use crate::domain::error::TerminalError;
use crate::domain::overlay_manager::OverlayManager;
use crate::domain::session::{OutputLine, PROMPT, Session, SubmitOutcome, key_level_lines};
use crate::domain::settings::{
    AssistantSettings, DataSettings, DataSource, PreferenceSettings, Settings, build_settings,
};
use crate::logging::{LogConfig, init_logging};
use crate::ports::bar_port::BarPort;
use crate::ports::preference_port::PreferencePort;

/// Exit code for input that matches no command.
const EXIT_PARSE_MISS: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "chartterm", about = "Command-driven stock chart terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Start the interactive terminal
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// SVG file rewritten after every command
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Run terminal commands from a file, one per line
    Script {
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Print key support, resistance and Fibonacci levels for a symbol
    Levels {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Show how a line of terminal input is parsed
    Parse { input: String },
}

/// Flag values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub output: Option<PathBuf>,
    pub csv_dir: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.action {
        Action::Run {
            config,
            symbol,
            output,
            csv_dir,
        } => {
            let overrides = Overrides {
                symbol,
                output,
                csv_dir,
            };
            prepare(config.as_deref(), overrides).and_then(run_terminal)
        }
        Action::Script {
            file,
            config,
            output,
            csv_dir,
        } => {
            let overrides = Overrides {
                output,
                csv_dir,
                ..Overrides::default()
            };
            prepare(config.as_deref(), overrides).and_then(|s| run_script(&file, s))
        }
        Action::Levels {
            symbol,
            config,
            csv_dir,
        } => {
            let overrides = Overrides {
                symbol: Some(symbol),
                csv_dir,
                ..Overrides::default()
            };
            prepare(config.as_deref(), overrides).and_then(run_levels)
        }
        Action::Parse { input } => Ok(run_parse(&input)),
    };

    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        (&e).into()
    })
}

/// Read the config file, or an empty config when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TerminalError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path),
        None => FileConfigAdapter::from_string("").map_err(|reason| TerminalError::ConfigParse {
            file: "<defaults>".into(),
            reason,
        }),
    }
}

/// Build settings from the config file and apply command-line overrides.
/// A `--csv-dir` flag selects the CSV data source.
pub fn resolve_settings(
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<Settings, TerminalError> {
    let adapter = load_config(config_path)?;
    let mut settings = build_settings(&adapter)?;

    if let Some(symbol) = overrides.symbol {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TerminalError::EmptySymbol);
        }
        settings.chart.symbol = symbol;
    }
    if let Some(output) = overrides.output {
        settings.chart.output = Some(output);
    }
    if let Some(csv_dir) = overrides.csv_dir {
        settings.data.source = DataSource::Csv;
        settings.data.csv_dir = csv_dir;
    }
    Ok(settings)
}

fn prepare(config_path: Option<&Path>, overrides: Overrides) -> Result<Settings, TerminalError> {
    let settings = resolve_settings(config_path, overrides)?;
    if let Err(e) = init_logging(&LogConfig::from_settings(&settings.log)) {
        eprintln!("warning: logging disabled: {e}");
    }
    info!(
        symbol = %settings.chart.symbol,
        source = ?settings.data.source,
        "settings loaded"
    );
    Ok(settings)
}

pub fn build_bar_port(data: &DataSettings) -> Result<Arc<dyn BarPort>, TerminalError> {
    match data.source {
        DataSource::Csv => Ok(Arc::new(CsvBarAdapter::new(data.csv_dir.clone()))),
        #[cfg(feature = "http")]
        DataSource::Http => Ok(Arc::new(
            crate::adapters::http_bar_adapter::HttpBarAdapter::new(&data.base_url),
        )),
        #[cfg(not(feature = "http"))]
        DataSource::Http => Err(TerminalError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "http support is not compiled in".into(),
        }),
    }
}

pub fn build_assistant(settings: &AssistantSettings) -> Assistant {
    #[cfg(feature = "http")]
    {
        let model = crate::adapters::anthropic_adapter::AnthropicAdapter::new(
            &settings.endpoint,
            &settings.model,
            settings.max_tokens,
        );
        Assistant::new(Some(Arc::new(model)), settings.api_key.clone())
    }

    #[cfg(not(feature = "http"))]
    {
        Assistant::new(None, settings.api_key.clone())
    }
}

pub fn build_preferences(settings: &PreferenceSettings) -> Box<dyn PreferencePort> {
    match &settings.path {
        Some(path) => Box::new(CsvPreferenceAdapter::new(path.clone())),
        None => Box::new(InMemoryPreferences::new()),
    }
}

/// Wire a session onto an SVG surface and a headless widget.
pub fn build_session(settings: &Settings) -> Result<Session<SvgSurface>, TerminalError> {
    let bars = build_bar_port(&settings.data)?;
    let surface = SvgSurface::new(settings.chart.width, settings.chart.height);
    let mut chart = OverlayManager::new(surface, bars, &settings.chart.symbol)
        .with_lookback_days(settings.data.lookback_days);
    chart.attach_widget(Box::new(HeadlessWidget::new()));
    chart.change_symbol(&settings.chart.symbol)?;

    Ok(Session::new(
        chart,
        build_assistant(&settings.assistant),
        build_preferences(&settings.preferences),
    ))
}

fn runtime() -> Result<tokio::runtime::Runtime, TerminalError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn print_lines<'a>(lines: impl IntoIterator<Item = &'a OutputLine>) {
    for line in lines {
        println!("{}", line.text);
    }
}

/// Print a submit's output. The echoed prompt line is skipped when the user
/// has just typed it.
fn print_outcome(outcome: &SubmitOutcome, echo: bool) {
    if outcome.cleared {
        // ANSI: clear screen, cursor home.
        print!("\x1b[2J\x1b[H");
    }
    let skip = usize::from(!echo && !outcome.cleared);
    print_lines(outcome.lines.iter().skip(skip));
}

/// Rewrite the SVG after a command. Failures are reported, not fatal.
fn write_chart(session: &Session<SvgSurface>, output: Option<&Path>) {
    let Some(path) = output else {
        return;
    };
    let chart = session.chart();
    if let Err(e) = chart.surface().write_to(path, chart.current_symbol()) {
        warn!(path = %path.display(), error = %e, "chart not written");
        eprintln!("warning: {e}");
    }
}

fn run_terminal(settings: Settings) -> Result<ExitCode, TerminalError> {
    let rt = runtime()?;
    rt.block_on(async {
        let mut session = build_session(&settings)?;
        let output = settings.chart.output.as_deref();

        print_lines(session.log());
        print_outcome(&session.start(settings.preferences.onboarding), true);
        write_chart(&session, output);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", PROMPT);
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                break;
            }
            let outcome = session.submit(trimmed).await;
            print_outcome(&outcome, false);
            write_chart(&session, output);
        }
        Ok::<_, TerminalError>(ExitCode::SUCCESS)
    })
}

fn run_script(file: &Path, settings: Settings) -> Result<ExitCode, TerminalError> {
    let rt = runtime()?;
    rt.block_on(async {
        let script = tokio::fs::read_to_string(file).await?;
        let mut session = build_session(&settings)?;
        let output = settings.chart.output.as_deref();

        print_outcome(&session.start(false), true);
        let mut executed = 0usize;
        for line in script.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                break;
            }
            let outcome = session.submit(line).await;
            print_outcome(&outcome, true);
            write_chart(&session, output);
            executed += 1;
        }
        info!(
            commands = executed,
            overlays = session.chart().overlays().len(),
            "script finished"
        );
        Ok::<_, TerminalError>(ExitCode::SUCCESS)
    })
}

fn run_levels(settings: Settings) -> Result<ExitCode, TerminalError> {
    let rt = runtime()?;
    let bars = build_bar_port(&settings.data)?;
    let levels = rt.block_on(find_key_levels(
        bars.as_ref(),
        &settings.chart.symbol,
        unix_now(),
    ))?;
    print_lines(&key_level_lines(&levels));
    Ok(ExitCode::SUCCESS)
}

fn run_parse(input: &str) -> ExitCode {
    match parse(input) {
        Some(command) => {
            println!("{command}");
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("bash: {}: command not found", input.trim());
            ExitCode::from(EXIT_PARSE_MISS)
        }
    }
}
