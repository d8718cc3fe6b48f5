//! Console output buffer
//!
//! The player and interpreter report every user-facing outcome through a
//! [`LineSink`]. [`ConsoleBuffer`] is the in-memory implementation the front
//! end drains each tick.

/// Prompt shown in front of the pending input line
pub const PROMPT: &str = "[cadence] ";

/// Severity prefixes prepended by the [`LineSink`] helpers
pub const INFO_PREFIX: &str = "[log.info]";
/// See [`INFO_PREFIX`]
pub const WARN_PREFIX: &str = "[log.warn]";
/// See [`INFO_PREFIX`]
pub const ERROR_PREFIX: &str = "[log.error]";

/// Destination for console lines
pub trait LineSink {
    /// Append one entry; `line` may span several text lines
    fn write_line(&mut self, line: &str);

    /// Append an informational line
    fn info(&mut self, message: &str) {
        self.write_line(&format!("{} {}", INFO_PREFIX, message));
    }

    /// Append a warning line
    fn warn(&mut self, message: &str) {
        self.write_line(&format!("{} {}", WARN_PREFIX, message));
    }

    /// Append an error line
    fn error(&mut self, message: &str) {
        self.write_line(&format!("{} {}", ERROR_PREFIX, message));
    }

    /// Reset the visible buffer
    ///
    /// Sinks without a visible buffer ignore this.
    fn clear(&mut self) {}
}

/// Welcome text the console starts with and returns to on `clear`
pub fn banner() -> String {
    format!(
        "cadence music player [Version {}]\n\nWelcome to the cadence CLI! (Enter \"help\" for details.)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Entries a [`ConsoleBuffer`] keeps by default
pub const DEFAULT_SCROLLBACK: usize = 500;

/// Bounded line buffer with an unread marker
///
/// Once more than `scrollback` entries are held the oldest are dropped.
#[derive(Debug, Clone)]
pub struct ConsoleBuffer {
    lines: Vec<String>,
    unread: usize,
    scrollback: usize,
}

impl ConsoleBuffer {
    /// Create a buffer holding only the banner
    pub fn new() -> Self {
        Self::with_scrollback(DEFAULT_SCROLLBACK)
    }

    /// Create a buffer that keeps at most `scrollback` entries (at least one)
    pub fn with_scrollback(scrollback: usize) -> Self {
        Self {
            lines: vec![banner()],
            unread: 0,
            scrollback: scrollback.max(1),
        }
    }

    /// Every entry currently visible, oldest first
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Entries appended since the previous call
    pub fn take_unread(&mut self) -> Vec<String> {
        let fresh = self.lines[self.unread..].to_vec();
        self.unread = self.lines.len();
        fresh
    }

    /// Entries starting with `prefix`
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.lines.iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for ConsoleBuffer {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());

        let overflow = self.lines.len().saturating_sub(self.scrollback);
        if overflow > 0 {
            self.lines.drain(..overflow);
            self.unread = self.unread.saturating_sub(overflow);
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.lines.push(banner());
        self.unread = 0;
    }
}
