//! Desktop audio engine for Cadence using CPAL
//!
//! Provides [`CpalEngine`], the [`cadence_playback::AudioEngine`]
//! implementation for desktop platforms, and [`sources::FileDecoder`], the
//! Symphonia-based streaming decoder it feeds the device with.
//!
//! # Features
//!
//! - Cross-platform output through the default CPAL device
//! - Automatic sample rate conversion with rubato
//! - Engine-wide linear gain
//! - Per-sound start, stop and frame-accurate seek
//!
//! # Example
//!
//! ```no_run
//! use cadence_audio_desktop::CpalEngine;
//! use cadence_playback::{ConsoleBuffer, PlaybackConfig, Player};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = CpalEngine::new()?;
//! let mut player = Player::new(Box::new(engine), &PlaybackConfig::default());
//! let mut console = ConsoleBuffer::new();
//!
//! player.play_query("intro", &mut console);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
pub mod sources;

pub use engine::{CpalEngine, CpalSound};
pub use error::{AudioError, Result};
