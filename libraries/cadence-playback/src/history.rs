//! Input history tracking
//!
//! Maintains a bounded history of committed command lines for up/down recall

use std::collections::VecDeque;

/// Command line history with bounded size
///
/// Lines are appended on commit and deduplicated only against the
/// immediately preceding entry. Recall walks backwards from the newest line.
#[derive(Debug, Clone)]
pub struct InputHistory {
    /// History buffer (most recent = back)
    lines: VecDeque<String>,

    /// Maximum history size
    max_size: usize,

    /// Recall position; `None` means "past the newest entry"
    cursor: Option<usize>,
}

impl InputHistory {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            cursor: None,
        }
    }

    /// Record a committed line
    ///
    /// Returns `false` when the line repeats the previous entry and was not
    /// stored. The recall cursor is reset either way.
    pub fn push(&mut self, line: &str) -> bool {
        self.cursor = None;

        if self.max_size == 0 || self.lines.back().is_some_and(|last| last == line) {
            return false;
        }

        if self.lines.len() >= self.max_size {
            self.lines.pop_front(); // Remove oldest
        }
        self.lines.push_back(line.to_string());
        true
    }

    /// Step one entry back (up arrow)
    ///
    /// Stays on the oldest entry once reached.
    pub fn recall_previous(&mut self) -> Option<&str> {
        let index = match self.cursor {
            None => self.lines.len().checked_sub(1)?,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(index);
        self.lines.get(index).map(String::as_str)
    }

    /// Step one entry forward (down arrow)
    ///
    /// Stays on the newest entry once reached; returns `None` if recall has
    /// not started.
    pub fn recall_next(&mut self) -> Option<&str> {
        let index = self.cursor?;
        let index = (index + 1).min(self.lines.len().saturating_sub(1));
        self.cursor = Some(index);
        self.lines.get(index).map(String::as_str)
    }

    /// Most recent line (without moving the cursor)
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// All lines (oldest first)
    pub fn get_all(&self) -> Vec<&str> {
        self.lines.iter().map(String::as_str).collect()
    }

    /// Number of stored lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
