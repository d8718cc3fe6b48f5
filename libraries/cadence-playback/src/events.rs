//! Playback Events
//!
//! Signals produced by the tick loop. The player reacts to them itself; they
//! are also returned to the caller so a UI layer can refresh on change.

use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The active sound crossed its last frame
    ///
    /// Emitted once per traversal of the boundary.
    EndOfTrack,

    /// End of track was handled by loading another track
    TrackChanged {
        /// Display name of the new track
        name: String,
    },

    /// End of track was handled by rewinding the finished track and pausing
    Rewound,
}
