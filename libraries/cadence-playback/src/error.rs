//! Error types for playback management

use std::path::PathBuf;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No catalog entry matched the query
    #[error("No track matches query: {0}")]
    NotFound(String),

    /// The file exists but could not be opened or decoded
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode {
        /// File that failed to decode
        path: PathBuf,
        /// Backend-specific description
        reason: String,
    },

    /// Audio device failure
    #[error("Audio device error: {0}")]
    Device(String),

    /// Seek target outside `[0, total_frames]`
    #[error("Invalid seek position: frame {0}")]
    InvalidSeekPosition(u64),

    /// Index out of bounds (1-based, as entered by the user)
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Malformed user argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybackError {
    /// Build a decode error for `path`
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
