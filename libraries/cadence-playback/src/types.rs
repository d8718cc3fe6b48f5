//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A resolved, playable catalog entry
///
/// Produced by catalog resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Display name (the file stem)
    pub name: String,

    /// File path for audio decoding
    pub path: PathBuf,
}

impl TrackRef {
    /// Create a track reference
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a track reference named after the file stem of `path`
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, path)
    }
}

/// Advance policy used by `next` and at end-of-track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistMode {
    /// Alphabetically next file in the catalog
    #[default]
    Sequential,

    /// Uniformly random catalog entry other than the current one
    Shuffle,

    /// Next slot of the user-managed queue
    Queued,
}

impl fmt::Display for PlaylistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaylistMode::Sequential => "sequential",
            PlaylistMode::Shuffle => "shuffle",
            PlaylistMode::Queued => "queued",
        };
        f.write_str(name)
    }
}

/// Configuration for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Root directory scanned for audio files (default: `music/`)
    pub music_root: PathBuf,

    /// Initial linear engine gain (default: 1.0)
    pub initial_volume: f32,

    /// Initial playlist mode (default: Sequential)
    pub mode: PlaylistMode,

    /// Whether queued mode wraps around (default: false)
    pub looping: bool,

    /// Maximum number of remembered input lines (default: 100)
    pub history_size: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            music_root: PathBuf::from("music/"),
            initial_volume: 1.0,
            mode: PlaylistMode::Sequential,
            looping: false,
            history_size: 100,
        }
    }
}
