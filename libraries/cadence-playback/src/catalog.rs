//! Track catalog: audio files discoverable under the music root
//!
//! Every lookup walks the directory tree again; nothing is cached, so files
//! added or removed while the player runs are picked up on the next command.
//! Ties inside a matching tier resolve to directory iteration order, which is
//! platform-dependent.

use crate::error::{PlaybackError, Result};
use crate::types::TrackRef;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Check if a file is a supported audio file
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Matching tier used by [`Catalog::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Exact,
    Prefix,
    Substring,
}

impl Tier {
    const ORDER: [Tier; 3] = [Tier::Exact, Tier::Prefix, Tier::Substring];

    fn matches(self, stem: &str, query: &str) -> bool {
        match self {
            Tier::Exact => stem == query,
            Tier::Prefix => stem.starts_with(query),
            Tier::Substring => stem.contains(query),
        }
    }
}

/// Filesystem-backed track catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    /// Create a catalog rooted at `root`
    ///
    /// The directory does not need to exist; a missing root is an empty catalog.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Whether the root directory currently exists
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Live scan of every audio file, in traversal order
    pub fn entries(&self) -> Vec<TrackRef> {
        self.walk().map(|path| TrackRef::from_path(&path)).collect()
    }

    /// Every audio file sorted by path
    pub fn sorted(&self) -> Vec<TrackRef> {
        let mut tracks = self.entries();
        tracks.sort_by(|a, b| a.path.cmp(&b.path));
        tracks
    }

    /// Resolve a user query to a file
    ///
    /// Case-insensitive, first match wins: exact stem, then stem prefix, then
    /// stem substring. Each tier performs its own traversal.
    pub fn resolve(&self, query: &str) -> Result<TrackRef> {
        let needle = query.to_lowercase();

        for tier in Tier::ORDER {
            let hit = self.walk().find(|path| {
                path.file_stem()
                    .map(|stem| tier.matches(&stem.to_string_lossy().to_lowercase(), &needle))
                    .unwrap_or(false)
            });

            if let Some(path) = hit {
                tracing::debug!(query, ?tier, path = %path.display(), "resolved track");
                return Ok(TrackRef::from_path(&path));
            }
        }

        Err(PlaybackError::NotFound(query.to_string()))
    }

    fn walk(&self) -> impl Iterator<Item = PathBuf> {
        let walker = self
            .exists()
            .then(|| WalkDir::new(&self.root).follow_links(true));

        walker
            .into_iter()
            .flat_map(IntoIterator::into_iter)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable catalog entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
            .map(walkdir::DirEntry::into_path)
    }
}
