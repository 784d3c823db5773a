//! Command suggestions for free-text intents.
//!
//! Suggestions come from local keyword scoring. When fewer than three local
//! matches exist and an API key is configured, a language model is asked
//! instead; any remote failure falls back to the local result.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::error::TerminalError;
use crate::ports::llm_port::LanguageModelPort;

pub const MAX_SUGGESTIONS: usize = 3;
const SCORED_CANDIDATES: usize = 5;

/// `(name, syntax)` of every command the assistant may suggest.
pub const COMMAND_CATALOG: [(&str, &str); 18] = [
    ("horizontal line", "horizontal line <price>"),
    ("hline", "hline <price>"),
    ("vertical line", "vertical line"),
    ("vline", "vline"),
    ("support", "support <price>"),
    ("resistance", "resistance <price>"),
    ("symbol", "symbol <ticker>"),
    ("stock", "stock <number>"),
    ("stocks", "stocks"),
    ("ma", "ma <period>"),
    ("sma", "sma <period>"),
    ("ema", "ema <period>"),
    ("bb", "bb <period>"),
    ("fib", "fib <start> <end>"),
    ("clear", "clear"),
    ("reset", "reset"),
    ("help", "help"),
    ("history", "history"),
];

const KEYWORD_GROUPS: [(&str, &[&str]); 47] = [
    ("price", &["horizontal line", "hline", "support", "resistance", "fib"]),
    ("level", &["support", "resistance", "horizontal line", "fib"]),
    ("key", &["support", "resistance", "fib"]),
    ("support", &["support", "horizontal line", "fib"]),
    ("resistance", &["resistance", "horizontal line", "fib"]),
    ("sr", &["support", "resistance"]),
    ("line", &["horizontal line", "vertical line", "hline", "vline", "support", "resistance"]),
    ("draw", &["horizontal line", "vertical line", "support", "resistance", "fib"]),
    ("mark", &["horizontal line", "vertical line", "support", "resistance"]),
    ("add", &["horizontal line", "vertical line", "ma", "ema", "bb"]),
    ("technical", &["ma", "ema", "bb", "fib", "support", "resistance"]),
    ("analysis", &["ma", "ema", "bb", "fib", "support", "resistance"]),
    ("ta", &["ma", "ema", "bb", "fib"]),
    ("indicator", &["ma", "ema", "bb", "fib"]),
    ("moving", &["ma", "sma", "ema"]),
    ("average", &["ma", "sma", "ema"]),
    ("ma", &["ma", "sma", "ema"]),
    ("momentum", &["ma", "ema"]),
    ("trend", &["ma", "ema", "support", "resistance"]),
    ("volatility", &["bb", "bollinger"]),
    ("bollinger", &["bb", "bollinger"]),
    ("bands", &["bb", "bollinger"]),
    ("bb", &["bb"]),
    ("fibonacci", &["fib", "fibonacci"]),
    ("fib", &["fib", "fibonacci"]),
    ("retracement", &["fib", "fibonacci"]),
    ("golden", &["fib"]),
    ("stock", &["symbol", "stocks", "stock"]),
    ("symbol", &["symbol", "stock"]),
    ("ticker", &["symbol", "stock"]),
    ("change", &["symbol", "stock", "reset"]),
    ("switch", &["symbol", "stock"]),
    ("view", &["stocks", "symbol"]),
    ("list", &["stocks", "help"]),
    ("preference", &["stocks", "reset"]),
    ("clear", &["clear", "reset"]),
    ("remove", &["clear"]),
    ("delete", &["clear"]),
    ("clean", &["clear"]),
    ("reset", &["reset", "clear"]),
    ("help", &["help", "stocks"]),
    ("command", &["help"]),
    ("how", &["help", "ask"]),
    ("what", &["help", "ask"]),
    ("time", &["vertical line", "vline"]),
    ("now", &["vertical line", "vline"]),
    ("current", &["vertical line", "vline", "stocks"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub command: String,
    pub reason: String,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.command, self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Local,
    Model,
}

fn in_catalog(command: &str) -> bool {
    COMMAND_CATALOG.iter().any(|(name, _)| *name == command)
}

fn keyword_matches(query: &str, keyword: &str) -> bool {
    query.contains(keyword)
        || keyword.contains(query)
        || query
            .split_whitespace()
            .any(|word| keyword.contains(word) || word.contains(keyword))
}

fn contextual_reason(command: &str, query: &str) -> String {
    if query.contains("key") || query.contains("level") {
        let reason = match command {
            "support" => Some("mark key support level"),
            "resistance" => Some("mark key resistance level"),
            "fib" => Some("find fibonacci key levels"),
            "horizontal line" => Some("draw custom price level"),
            _ => None,
        };
        if let Some(r) = reason {
            return r.to_string();
        }
    }
    if query.contains("find") || query.contains("identify") {
        let reason = match command {
            "support" => Some("identify support zones"),
            "resistance" => Some("identify resistance zones"),
            "fib" => Some("find fibonacci levels"),
            "ma" => Some("find trend with MA"),
            _ => None,
        };
        if let Some(r) = reason {
            return r.to_string();
        }
    }
    short_reason(command, query)
}

fn short_reason(command: &str, query: &str) -> String {
    let reason = match command {
        "horizontal line" => "draws price level line",
        "vertical line" => "marks time on chart",
        "support" => "green support price level",
        "resistance" => "red resistance price level",
        "symbol" => "change chart stock symbol",
        "stocks" => "show your stock preferences",
        "ma" => "simple moving average indicator",
        "ema" => "exponential moving average indicator",
        "bb" => "bollinger bands volatility indicator",
        "fib" => "fibonacci retracement levels",
        "clear" => "remove all chart overlays",
        "reset" => "reset stock preferences",
        "help" => "show all available commands",
        _ => return format!("matches {} query", query),
    };
    reason.to_string()
}

/// Keyword-scored suggestions; never empty (falls back to `help`).
pub fn local_suggestions(query: &str) -> Vec<Suggestion> {
    let q = query.trim().to_lowercase();
    // insertion order breaks score ties
    let mut order: Vec<&str> = Vec::new();
    let mut scores: HashMap<&str, u32> = HashMap::new();
    let mut bump = |command: &'static str, by: u32| {
        if !scores.contains_key(command) {
            order.push(command);
        }
        *scores.entry(command).or_insert(0) += by;
    };

    if !q.is_empty() {
        for (keyword, commands) in KEYWORD_GROUPS {
            if keyword_matches(&q, keyword) {
                let score = if q.contains(keyword) { 2 } else { 1 };
                for &command in commands {
                    bump(command, score);
                }
            }
        }
        for (name, _) in COMMAND_CATALOG {
            if name.contains(q.as_str()) || q.contains(name) {
                bump(name, 3);
            }
        }
    }

    let mut ranked: Vec<(&str, u32)> = order.iter().map(|c| (*c, scores[c])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut suggestions: Vec<Suggestion> = Vec::new();
    for (command, _) in ranked.into_iter().take(SCORED_CANDIDATES) {
        if in_catalog(command) && !suggestions.iter().any(|s| s.command == command) {
            suggestions.push(Suggestion {
                command: command.to_string(),
                reason: contextual_reason(command, &q),
            });
        }
        if suggestions.len() >= MAX_SUGGESTIONS {
            break;
        }
    }

    if suggestions.is_empty() {
        suggestions.push(Suggestion {
            command: "help".into(),
            reason: "show all available commands".into(),
        });
    }
    suggestions
}

pub fn build_prompt(query: &str) -> String {
    let commands: Vec<&str> = COMMAND_CATALOG.iter().map(|(name, _)| *name).collect();
    format!(
        r#"You are a stock trading terminal assistant. User asks: "{query}"

Available commands:
{commands}

IMPORTANT context:
- "key levels" means support, resistance, and fibonacci levels
- "technical analysis" includes MA, EMA, BB, fibonacci
- "price levels" refers to horizontal lines, support, resistance
- Always suggest multiple related commands when appropriate

For the query above, suggest 1-3 most relevant commands.
Format each as: "command - reason (max 7 words)"

Examples:
Query: "find key levels"
Response:
support - mark key support level
resistance - mark key resistance level
fib - find fibonacci retracement levels

Query: "how to see trends"
Response:
ma - shows price trend direction
ema - responsive trend indicator

Only output the command suggestions, no other text."#,
        query = query,
        commands = commands.join("\n"),
    )
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Parse `command - reason` lines; the command is one or two words.
pub fn parse_model_reply(reply: &str) -> Vec<Suggestion> {
    reply
        .lines()
        .filter_map(|line| {
            let (left, right) = line.trim().split_once('-')?;
            let words: Vec<&str> = left.split_whitespace().collect();
            let reason = right.trim();
            let valid = (1..=2).contains(&words.len())
                && words.iter().all(|w| is_word(w))
                && !reason.is_empty();
            valid.then(|| Suggestion {
                command: words.join(" "),
                reason: reason.to_string(),
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

pub struct Assistant {
    model: Option<Arc<dyn LanguageModelPort>>,
    api_key: Option<String>,
}

impl Assistant {
    pub fn new(model: Option<Arc<dyn LanguageModelPort>>, api_key: Option<String>) -> Self {
        Self {
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn local_only() -> Self {
        Self::new(None, None)
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = Some(key.to_string()).filter(|k| !k.trim().is_empty());
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn suggest(&self, query: &str) -> (Vec<Suggestion>, SuggestionSource) {
        let local = local_suggestions(query);
        let (Some(model), Some(key)) = (self.model.as_ref(), self.api_key.as_deref()) else {
            return (local, SuggestionSource::Local);
        };
        if local.len() >= MAX_SUGGESTIONS {
            return (local, SuggestionSource::Local);
        }

        debug!(query, local = local.len(), "asking language model");
        match self.ask_model(model.as_ref(), key, query).await {
            Ok(remote) if !remote.is_empty() => {
                info!(count = remote.len(), "model suggestions received");
                (remote, SuggestionSource::Model)
            }
            Ok(_) => {
                warn!("model reply had no suggestions, using local matches");
                (local, SuggestionSource::Local)
            }
            Err(e) => {
                warn!(error = %e, "model request failed, using local matches");
                (local, SuggestionSource::Local)
            }
        }
    }

    async fn ask_model(
        &self,
        model: &dyn LanguageModelPort,
        key: &str,
        query: &str,
    ) -> Result<Vec<Suggestion>, TerminalError> {
        let reply = model.complete(key, &build_prompt(query)).await?;
        Ok(parse_model_reply(&reply))
    }
}
