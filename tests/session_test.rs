//! End-to-end terminal sessions: input line in, output lines and chart
//! overlays out.

mod common;

use chartterm::adapters::csv_preference_adapter::InMemoryPreferences;
use chartterm::domain::assistant::Assistant;
use chartterm::domain::history::{HISTORY_CAPACITY, HistoryStep};
use chartterm::domain::overlay::OverlayKind;
use chartterm::domain::preferences::parse_selection;
use chartterm::domain::session::{
    BANNER, HELP_HINT, OutputKind, PROMPT, Session, SessionMode, SubmitOutcome,
};
use chartterm::ports::llm_port::LanguageModelPort;
use chartterm::ports::surface_port::LineOrientation;
use chartterm::ports::preference_port::PreferencePort;
use common::*;
use std::sync::Arc;

fn texts(outcome: &SubmitOutcome) -> Vec<&str> {
    outcome.lines.iter().map(|l| l.text.as_str()).collect()
}

fn status_lines(outcome: &SubmitOutcome) -> Vec<&str> {
    texts(outcome)
        .into_iter()
        .filter(|t| t.starts_with('✓') || t.starts_with('✗'))
        .collect()
}

mod drawing {
    use super::*;

    #[tokio::test]
    async fn levels_then_clear() {
        let mut s = session(MockBarPort::new());

        let outcomes = [
            s.submit("support 180").await,
            s.submit("resistance 220").await,
            s.submit("fib 150 200").await,
        ];
        assert_eq!(status_lines(&outcomes[0]), vec!["✓ Added horizontal line at $180"]);
        assert_eq!(status_lines(&outcomes[1]), vec!["✓ Added horizontal line at $220"]);
        assert_eq!(
            status_lines(&outcomes[2]),
            vec!["✓ Added Fibonacci retracement from $150 to $200"]
        );
        assert_eq!(s.chart().overlays().len(), 3);

        let cleared = s.submit("clear").await;
        assert!(cleared.cleared);
        assert_eq!(s.chart().overlays().len(), 0);
        assert!(s.chart().surface().elements.is_empty());
        assert_eq!(
            texts(&cleared),
            vec![BANNER, HELP_HINT, "✓ Cleared terminal and all chart overlays"]
        );
        assert_eq!(s.log().len(), 3);
    }

    #[tokio::test]
    async fn clear_all_keeps_terminal_log() {
        let mut s = session(MockBarPort::new());
        s.submit("hline 150").await;
        let before = s.log().len();

        let outcome = s.submit("clear all").await;
        assert!(!outcome.cleared);
        assert_eq!(status_lines(&outcome), vec!["✓ Cleared all lines and shapes"]);
        assert!(s.chart().overlays().is_empty());
        assert_eq!(s.log().len(), before + 2);
    }

    #[tokio::test]
    async fn support_and_resistance_use_level_colors() {
        let mut s = session(MockBarPort::new());
        s.submit("support 180").await;
        s.submit("resistance 220").await;
        s.submit("hline 200").await;

        let colors: Vec<&str> = s
            .chart()
            .surface()
            .lines()
            .iter()
            .map(|l| l.color.as_str())
            .collect();
        assert_eq!(colors, vec!["#4CAF50", "#F44336", "#2196F3"]);
    }

    #[tokio::test]
    async fn every_drawing_command_reports_once() {
        let bars = MockBarPort::new().with_bars("AAPL", trending_bars(40, 100.0, 1.0));
        let mut s = session(bars);

        for input in [
            "horizontal line 210",
            "vline",
            "ma 20",
            "ema 9",
            "bb 20",
            "fibonacci 100 200",
            "sma 200",
        ] {
            let outcome = s.submit(input).await;
            assert_eq!(status_lines(&outcome).len(), 1, "input {input:?}");
        }
        assert_eq!(s.chart().overlays().len(), 6);
    }

    #[tokio::test]
    async fn vline_is_stamped_with_session_clock() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("vline").await;
        assert_eq!(status_lines(&outcome).len(), 1);

        let overlay = &s.chart().overlays()[0];
        assert_eq!(
            overlay.kind,
            OverlayKind::VerticalLine {
                time: NOW,
                color: "#FF9800".into(),
            }
        );
        let x = match s.chart().surface().lines()[0].orientation {
            LineOrientation::Vertical { x } => x,
            ref other => panic!("expected a vertical line, got {other:?}"),
        };
        assert_eq!(x, 800.0);
    }

    #[tokio::test]
    async fn indicator_without_data_reports_failure() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("sma 20").await;
        assert_eq!(
            status_lines(&outcome),
            vec!["✗ Not enough data for SMA(20) on AAPL: nothing drawn"]
        );
        assert!(outcome.lines.iter().any(|l| l.kind == OutputKind::Error));
        assert!(s.chart().overlays().is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_become_error_lines() {
        let mut s = session(MockBarPort::new().with_error("AAPL", "timed out"));
        let outcome = s.submit("bb 20").await;
        assert_eq!(
            status_lines(&outcome),
            vec!["✗ failed to fetch bars for AAPL: timed out"]
        );
    }
}

mod terminal {
    use super::*;

    #[tokio::test]
    async fn unknown_input_prints_not_found() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("fib 100").await;
        assert_eq!(
            texts(&outcome),
            vec![
                &format!("{} fib 100", PROMPT)[..],
                "bash: fib 100: command not found",
                HELP_HINT,
            ]
        );
    }

    #[tokio::test]
    async fn blank_input_only_echoes_prompt() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("   ").await;
        assert_eq!(outcome.lines.len(), 1);
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn history_keeps_last_hundred() {
        let mut s = session(MockBarPort::new());
        for i in 0..=HISTORY_CAPACITY {
            s.submit(&format!("hline {}", 100 + i)).await;
        }
        assert_eq!(s.history().len(), HISTORY_CAPACITY);
        assert_eq!(s.history().get(0), Some("hline 200"));

        assert_eq!(s.navigate_history(HistoryStep::Older).as_deref(), Some("hline 200"));
        assert_eq!(s.navigate_history(HistoryStep::Older).as_deref(), Some("hline 199"));
        assert_eq!(s.navigate_history(HistoryStep::Newer).as_deref(), Some("hline 200"));
        assert_eq!(s.navigate_history(HistoryStep::Newer).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn history_command_lists_recent_entries() {
        let mut s = session(MockBarPort::new());
        s.submit("hline 150").await;
        let outcome = s.submit("history").await;
        assert_eq!(
            &texts(&outcome)[1..],
            &["Command History:", "  2: history", "  1: hline 150"]
        );
    }

    #[tokio::test]
    async fn help_mentions_every_keyword() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("?").await;
        let body = texts(&outcome).join("\n");
        for keyword in [
            "horizontal line", "hline", "vertical line", "vline", "support", "resistance",
            "ma ", "sma", "ema", "bb ", "bollinger", "fib ", "fibonacci", "symbol", "clear",
            "ask", "setkey",
        ] {
            assert!(body.contains(keyword), "help is missing {keyword:?}");
        }
    }

    #[tokio::test]
    async fn symbol_command_switches_chart() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("symbol tsla").await;
        assert_eq!(status_lines(&outcome), vec!["✓ Changed symbol to TSLA"]);
        assert_eq!(s.chart().current_symbol(), "TSLA");
    }

    #[tokio::test]
    async fn symbol_failure_is_reported() {
        let chart = manager_with(MockBarPort::new(), ScriptedWidget::failing_all(), "AAPL");
        let mut s = Session::new(
            chart,
            Assistant::local_only(),
            Box::new(InMemoryPreferences::new()),
        );
        let outcome = s.submit("symbol MSFT").await;
        assert_eq!(
            status_lines(&outcome),
            vec!["✗ could not change symbol to MSFT: every widget strategy failed"]
        );
        assert_eq!(s.chart().current_symbol(), "AAPL");
    }

    #[tokio::test]
    async fn analyze_reports_levels_and_suggestions() {
        let closes: Vec<f64> = (0..60).map(|i| 150.0 + ((i % 10) as f64 - 5.0) * 4.0).collect();
        let mut s = session(MockBarPort::new().with_bars("AAPL", daily_bars(&closes)));

        let outcome = s.submit("analyze").await;
        let lines = texts(&outcome);
        assert_eq!(lines[1], "Analyzing AAPL...");
        assert!(lines[2].starts_with("Key levels for AAPL"));
        assert!(lines.contains(&"Suggested commands:"));
        assert!(lines.iter().any(|l| l.starts_with("  fib ")));
    }

    #[tokio::test]
    async fn analyze_without_enough_bars_fails() {
        let mut s = session(MockBarPort::new().with_bars("AAPL", trending_bars(5, 100.0, 1.0)));
        let outcome = s.submit("levels").await;
        assert_eq!(
            status_lines(&outcome),
            vec!["✗ insufficient data for AAPL: have 5 bars, need 20"]
        );
    }
}

mod assistant {
    use super::*;

    fn with_model(model: Arc<dyn LanguageModelPort>) -> Session<RecordingSurface> {
        Session::new(
            manager(MockBarPort::new()),
            Assistant::new(Some(model), Some("sk-test".into())),
            Box::new(InMemoryPreferences::new()),
        )
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_local() {
        let model = Arc::new(ScriptedModel::failing("timeout"));
        let mut s = with_model(model.clone());

        let outcome = s.submit("ask qqqq").await;
        assert_eq!(model.call_count(), 1);
        let lines = texts(&outcome);
        assert_eq!(lines[1], "Suggested commands:");
        assert!(lines[2].starts_with("  help - "));
    }

    #[tokio::test]
    async fn model_suggestions_are_shown() {
        let model = Arc::new(ScriptedModel::replying(
            "hline - draw a price line\nnot a suggestion\nbb - volatility bands",
        ));
        let mut s = with_model(model.clone());

        let outcome = s.submit("ask qqqq").await;
        assert_eq!(
            &texts(&outcome)[1..],
            &[
                "Suggested commands (language model):",
                "  hline - draw a price line",
                "  bb - volatility bands",
            ]
        );
    }

    #[tokio::test]
    async fn strong_local_match_skips_model() {
        let model = Arc::new(ScriptedModel::replying("hline - unused"));
        let mut s = with_model(model.clone());

        let outcome = s.submit("ask find key levels").await;
        assert_eq!(model.call_count(), 0);
        assert_eq!(texts(&outcome)[1], "Suggested commands:");
        assert_eq!(outcome.lines.len(), 5);
    }

    #[tokio::test]
    async fn model_is_never_called_without_api_key() {
        let model = Arc::new(ScriptedModel::replying("hline - unused"));
        let mut s = Session::new(
            manager(MockBarPort::new()),
            Assistant::new(Some(model.clone()), None),
            Box::new(InMemoryPreferences::new()),
        );

        let outcome = s.submit("ask qqqq").await;
        assert_eq!(model.call_count(), 0);
        let lines = texts(&outcome);
        assert_eq!(lines[1], "Suggested commands:");
        assert!(lines[2].starts_with("  help - "));
    }

    #[tokio::test]
    async fn setkey_without_model_stays_local() {
        let mut s = session(MockBarPort::new());
        let outcome = s.submit("setkey sk-abc").await;
        assert_eq!(status_lines(&outcome), vec!["✓ API key saved"]);
        assert!(s.assistant().has_api_key());
        assert!(!texts(&outcome).iter().any(|l| l.contains("sk-abc") && !l.starts_with(PROMPT)));
    }
}

mod onboarding {
    use super::*;

    #[tokio::test]
    async fn requires_three_selections_then_switches_symbol() {
        let mut s = session(MockBarPort::new());
        s.start(true);
        assert_eq!(s.mode(), SessionMode::Onboarding);

        let outcome = s.submit("1 2").await;
        assert_eq!(
            status_lines(&outcome),
            vec!["✗ preference store error: select at least 3 stocks (2 selected)"]
        );
        assert_eq!(s.mode(), SessionMode::Onboarding);

        let outcome = s.submit("7, amd 1").await;
        assert_eq!(
            status_lines(&outcome),
            vec![
                "✓ Saved 3 stock preferences: NVDA, AMD, AAPL",
                "✓ Changed symbol to NVDA",
            ]
        );
        assert_eq!(s.mode(), SessionMode::Terminal);
        assert_eq!(s.chart().current_symbol(), "NVDA");
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history().get(0), Some("7, amd 1"));
        assert_eq!(s.history().get(1), Some("1 2"));

        let outcome = s.submit("stock 2").await;
        assert_eq!(status_lines(&outcome), vec!["✓ Changed symbol to AMD"]);
        let outcome = s.submit("stock 9").await;
        assert_eq!(
            status_lines(&outcome),
            vec!["✗ No stock #9 in your preferences (you have 3)"]
        );
    }

    #[tokio::test]
    async fn saved_preferences_skip_onboarding() {
        let saved = parse_selection("AAPL MSFT GOOGL").unwrap();
        let mut s = Session::new(
            manager(MockBarPort::new()),
            Assistant::local_only(),
            Box::new(InMemoryPreferences::with(saved)),
        );
        let outcome = s.start(true);
        assert_eq!(s.mode(), SessionMode::Terminal);
        assert_eq!(
            texts(&outcome),
            vec!["Your stocks: AAPL, MSFT, GOOGL (type 'stocks' to list)"]
        );

        let listing = s.submit("stocks").await;
        assert!(texts(&listing).contains(&"  2. MSFT - Microsoft Corporation (tech)"));
    }

    #[tokio::test]
    async fn reset_clears_and_restarts_onboarding() {
        let mut prefs = InMemoryPreferences::new();
        prefs.save(&parse_selection("1 2 3").unwrap()).unwrap();
        let mut s = Session::new(manager(MockBarPort::new()), Assistant::local_only(), Box::new(prefs));

        let outcome = s.submit("reset").await;
        assert_eq!(texts(&outcome)[1], "✓ Cleared stock preferences");
        assert_eq!(s.mode(), SessionMode::Onboarding);
    }
}
