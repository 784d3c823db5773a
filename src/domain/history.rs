//! Command history with newest-first storage and a navigation cursor.

use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    /// Towards older entries (arrow up).
    Older,
    /// Towards newer entries (arrow down).
    Newer,
}

#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    /// `None` means the cursor is past the newest entry (position -1).
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted command and reset navigation.
    pub fn push(&mut self, command: &str) {
        self.entries.push_front(command.to_string());
        self.entries.truncate(HISTORY_CAPACITY);
        self.cursor = None;
    }

    /// Entry `index` positions back; 0 is the most recent.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `n` entries, newest first, paired with their ordinal
    /// (`len - index`, so the oldest entry is 1).
    pub fn recent(&self, n: usize) -> Vec<(usize, &str)> {
        let len = self.entries.len();
        self.entries
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, cmd)| (len - i, cmd.as_str()))
            .collect()
    }

    /// Move the cursor and return the text to place in the input line.
    /// Returns `None` when there is no history to navigate.
    pub fn navigate(&mut self, step: HistoryStep) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = match (step, self.cursor) {
            (HistoryStep::Older, None) => Some(0),
            (HistoryStep::Older, Some(i)) => Some((i + 1).min(self.entries.len() - 1)),
            (HistoryStep::Newer, None) | (HistoryStep::Newer, Some(0)) => None,
            (HistoryStep::Newer, Some(i)) => Some(i - 1),
        };
        Some(match self.cursor {
            Some(i) => self.entries[i].as_str(),
            None => "",
        })
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Cursor position; -1 when not navigating.
    pub fn cursor(&self) -> isize {
        self.cursor.map_or(-1, |i| i as isize)
    }
}
