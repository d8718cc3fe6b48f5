//! User-managed playlist queue
//!
//! Insertion order is play order. The cursor is either unset or a valid index
//! into the entries:
//!
//! ```text
//! 1. Intro
//! 2. Song A < You Are Here
//! 3. Other
//! ```

use crate::error::{PlaybackError, Result};
use crate::types::TrackRef;
use std::fmt::Write as _;

/// Outcome of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Cursor now points at this index
    Moved(usize),

    /// Cursor was on the last entry and looping is off; cursor unchanged
    EndOfPlaylist,

    /// Nothing queued
    Empty,
}

/// Result of removing an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Entry that was removed
    pub track: TrackRef,

    /// Whether the cursor pointed at the removed entry and was re-seated
    pub was_current: bool,
}

/// Ordered playlist queue with a cursor
#[derive(Debug, Clone, Default)]
pub struct PlaylistQueue {
    entries: Vec<TrackRef>,
    cursor: Option<usize>,
}

impl PlaylistQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the end; cursor is untouched
    pub fn push(&mut self, track: TrackRef) {
        self.entries.push(track);
    }

    /// Remove every entry and unset the cursor
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in play order
    pub fn entries(&self) -> &[TrackRef] {
        &self.entries
    }

    /// Cursor position (0-based), `None` when unset
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&TrackRef> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    /// Move the cursor one slot forward
    ///
    /// An unset cursor moves to the first entry. From the last entry the
    /// cursor wraps to the first only when `looping` is set.
    pub fn advance(&mut self, looping: bool) -> Advance {
        if self.entries.is_empty() {
            return Advance::Empty;
        }

        let next = match self.cursor {
            None => 0,
            Some(i) if i + 1 < self.entries.len() => i + 1,
            Some(_) if looping => 0,
            Some(_) => return Advance::EndOfPlaylist,
        };

        self.cursor = Some(next);
        Advance::Moved(next)
    }

    /// Point the cursor at `index` (0-based)
    ///
    /// Returns whether the cursor actually moved.
    pub fn set_cursor(&mut self, index: usize) -> Result<bool> {
        if index >= self.entries.len() {
            return Err(PlaybackError::IndexOutOfBounds(index + 1));
        }

        let moved = self.cursor != Some(index);
        self.cursor = Some(index);
        Ok(moved)
    }

    /// Remove the entry at `index` (0-based)
    ///
    /// If the cursor pointed at it, the cursor moves to the entry that
    /// followed (wrapping to the first) or becomes unset when nothing is left.
    /// Cursors past the removed slot shift down so they keep their entry.
    pub fn remove(&mut self, index: usize) -> Result<Removal> {
        if index >= self.entries.len() {
            return Err(PlaybackError::IndexOutOfBounds(index + 1));
        }

        let was_current = self.cursor == Some(index);
        let track = self.entries.remove(index);

        self.cursor = match self.cursor {
            _ if self.entries.is_empty() => None,
            Some(c) if c == index => Some(if index < self.entries.len() { index } else { 0 }),
            Some(c) if c > index => Some(c - 1),
            other => other,
        };

        Ok(Removal { track, was_current })
    }

    /// Numbered listing with a marker on the cursor entry
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (i, track) in self.entries.iter().enumerate() {
            let _ = write!(out, "{}. {}", i + 1, track.name);
            if self.cursor == Some(i) {
                out.push_str(" < You Are Here");
            }
            out.push('\n');
        }
        out
    }
}
