//! Terminal command grammar.
//!
//! Each grammar rule is a small cursor-driven matcher tried in order against
//! the trimmed input. A rule only wins if it consumes the entire line, so
//! `fib 100` or `hline 210 extra` fall through to `None`. Keywords are
//! case-insensitive; decimals follow `\d+(\.\d+)?`, periods `\d+`, tickers
//! are ASCII letters.

use crate::domain::bar::unix_now;
use crate::domain::command::{Command, MaType, RESISTANCE_COLOR, SUPPORT_COLOR};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        let head = match remaining.get(..keyword.len()) {
            Some(h) => h,
            None => return false,
        };
        head.eq_ignore_ascii_case(keyword)
            && !remaining[keyword.len()..]
                .chars()
                .next()
                .map(|c| c.is_alphanumeric() || c == '_')
                .unwrap_or(false)
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    /// Matches a multi-word keyword such as `horizontal line`, words separated
    /// by any run of whitespace. Restores the cursor on failure.
    fn phrase(&mut self, words: &[&str]) -> bool {
        let start = self.pos;
        for (i, word) in words.iter().enumerate() {
            if i > 0 && self.separator().is_none() {
                self.pos = start;
                return false;
            }
            if !self.keyword(word) {
                self.pos = start;
                return false;
            }
        }
        true
    }

    /// At least one whitespace character.
    fn separator(&mut self) -> Option<()> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        (self.pos > start).then_some(())
    }

    fn digits(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        (self.pos > start).then(|| &self.input[start..self.pos])
    }

    fn decimal(&mut self) -> Option<f64> {
        let start = self.pos;
        self.digits()?;
        let rest = self.remaining();
        if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
            self.advance();
            self.digits()?;
        }
        self.input[start..self.pos].parse().ok()
    }

    fn integer(&mut self) -> Option<usize> {
        self.digits()?.parse().ok()
    }

    fn ticker(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
        (self.pos > start).then(|| self.input[start..self.pos].to_ascii_uppercase())
    }

    fn token(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                break;
            }
            self.advance();
        }
        (self.pos > start).then(|| &self.input[start..self.pos])
    }

    fn rest(&mut self) -> Option<&'a str> {
        let rest = self.remaining().trim();
        self.pos = self.input.len();
        (!rest.is_empty()).then_some(rest)
    }

    fn decimal_arg(&mut self) -> Option<f64> {
        self.separator()?;
        self.decimal()
    }

    fn integer_arg(&mut self) -> Option<usize> {
        self.separator()?;
        self.integer()
    }
}

type Rule = fn(&mut Parser<'_>, i64) -> Option<Command>;

const RULES: [Rule; 13] = [
    horizontal_line,
    vertical_line,
    clear,
    symbol,
    support,
    resistance,
    simple_moving_average,
    exponential_moving_average,
    fibonacci,
    bollinger_bands,
    help,
    ask,
    setkey,
];

/// Parse a terminal line, stamping time-based commands with the current clock.
pub fn parse(input: &str) -> Option<Command> {
    parse_at(input, unix_now())
}

/// Parse a terminal line using `now` (unix seconds) for time-based commands.
pub fn parse_at(input: &str, now: i64) -> Option<Command> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    RULES.iter().find_map(|rule| {
        let mut parser = Parser::new(trimmed);
        rule(&mut parser, now).filter(|_| parser.at_end())
    })
}

fn horizontal_line(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !(p.phrase(&["horizontal", "line"]) || p.keyword("hline")) {
        return None;
    }
    let price = p.decimal_arg()?;
    Some(Command::HorizontalLine { price, color: None })
}

fn vertical_line(p: &mut Parser<'_>, now: i64) -> Option<Command> {
    (p.phrase(&["vertical", "line"]) || p.keyword("vline"))
        .then_some(Command::VerticalLine { time: now })
}

fn clear(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    (p.phrase(&["clear", "all"]) || p.keyword("clear")).then_some(Command::Clear)
}

fn symbol(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !(p.keyword("symbol") || p.keyword("stock")) {
        return None;
    }
    p.separator()?;
    let symbol = p.ticker()?;
    Some(Command::Symbol { symbol })
}

fn support(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !p.keyword("support") {
        return None;
    }
    let price = p.decimal_arg()?;
    Some(Command::HorizontalLine {
        price,
        color: Some(SUPPORT_COLOR.to_string()),
    })
}

fn resistance(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !p.keyword("resistance") {
        return None;
    }
    let price = p.decimal_arg()?;
    Some(Command::HorizontalLine {
        price,
        color: Some(RESISTANCE_COLOR.to_string()),
    })
}

fn simple_moving_average(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !(p.keyword("ma") || p.keyword("sma")) {
        return None;
    }
    let period = p.integer_arg()?;
    Some(Command::MovingAverage {
        period,
        ma_type: MaType::Sma,
    })
}

fn exponential_moving_average(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !p.keyword("ema") {
        return None;
    }
    let period = p.integer_arg()?;
    Some(Command::MovingAverage {
        period,
        ma_type: MaType::Ema,
    })
}

fn fibonacci(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !(p.keyword("fib") || p.keyword("fibonacci")) {
        return None;
    }
    let start_price = p.decimal_arg()?;
    let end_price = p.decimal_arg()?;
    Some(Command::Fibonacci {
        start_price,
        end_price,
    })
}

fn bollinger_bands(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !(p.keyword("bb") || p.keyword("bollinger")) {
        return None;
    }
    let period = p.integer_arg()?;
    Some(Command::BollingerBands { period })
}

fn help(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    (p.keyword("help") || p.keyword("?")).then_some(Command::Help)
}

fn ask(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !p.keyword("ask") {
        return None;
    }
    p.separator()?;
    let query = p.rest()?.to_string();
    Some(Command::Ask { query })
}

fn setkey(p: &mut Parser<'_>, _now: i64) -> Option<Command> {
    if !p.keyword("setkey") {
        return None;
    }
    p.separator()?;
    let key = p.token()?.to_string();
    Some(Command::SetKey { key })
}

const HELP_TEXT: &str = "\
Available Commands:

LINES & LEVELS:
• horizontal line <price> - Draw horizontal line at specified price
• hline <price> - Short form for horizontal line
• vertical line - Draw vertical line at current time
• vline - Short form for vertical line
• support <price> - Draw green support line at price
• resistance <price> - Draw red resistance line at price

TECHNICAL INDICATORS:
• ma <period> - Simple Moving Average (e.g., ma 20)
• sma <period> - Simple Moving Average (e.g., sma 50)
• ema <period> - Exponential Moving Average (e.g., ema 21)
• bb <period> - Bollinger Bands (e.g., bb 20)
• bollinger <period> - Same as bb
• fib <start> <end> - Fibonacci retracement (e.g., fib 100 200)
• fibonacci <start> <end> - Same as fib
• analyze - Find key levels for the current symbol (also: levels)

CHART CONTROLS:
• symbol <ticker> - Change stock symbol (e.g., AAPL, MSFT)
• stock <ticker> - Same as symbol command
• clear all - Remove all drawn lines and indicators
• clear - Clear the terminal and all chart overlays (also: cls)

TERMINAL:
• history - Show the last 10 commands
• stocks - Show your saved stock preferences (also: preferences)
• stock <number> - Switch to a saved stock preference
• reset - Clear stock preferences and restart setup (also: setup)
• ask <question> - Suggest commands for what you want to do
• setkey <key> - Store an API key for assistant suggestions
• help - Show this help message (also: ?)

Examples:
• horizontal line 210
• support 180, resistance 220
• ma 50, ema 21
• fib 150 200
• bb 20
• symbol TSLA";

pub fn help_text() -> &'static str {
    HELP_TEXT
}
