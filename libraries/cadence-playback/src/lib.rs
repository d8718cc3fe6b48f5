//! Cadence - Playback Core
//!
//! Platform-agnostic playlist and playback control for the Cadence player.
//!
//! This crate provides:
//! - Track catalog resolution (exact, prefix, then substring match)
//! - A single playback session with edge-triggered end-of-track detection
//! - Sequential, shuffle and queued advance policies
//! - A line-oriented command interpreter with aliases
//! - Console output and input history buffers
//!
//! # Architecture
//!
//! `cadence-playback` has no audio-device dependency. Output and decoding are
//! provided through the [`AudioEngine`] and [`Sound`] traits; the desktop
//! implementation lives in `cadence-audio-desktop`.
//!
//! Everything here is single-threaded. The front end owns one [`Player`] and
//! one [`Interpreter`], feeds committed lines to [`Interpreter::submit`] and
//! calls [`Player::tick`] at a fixed rate.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_playback::{
//!     AudioEngine, ConsoleBuffer, Flow, Interpreter, PlaybackConfig, Player, Result, Sound,
//! };
//! use std::path::Path;
//!
//! struct NullEngine;
//!
//! impl AudioEngine for NullEngine {
//!     fn sample_rate(&self) -> u32 {
//!         44_100
//!     }
//!
//!     fn open(&mut self, path: &Path) -> Result<Box<dyn Sound>> {
//!         Err(cadence_playback::PlaybackError::decode(path, "no decoder"))
//!     }
//!
//!     fn volume(&self) -> f32 {
//!         1.0
//!     }
//!
//!     fn set_volume(&mut self, _gain: f32) {}
//! }
//!
//! let mut player = Player::new(Box::new(NullEngine), &PlaybackConfig::default());
//! let mut interpreter = Interpreter::default();
//! let mut console = ConsoleBuffer::new();
//!
//! if interpreter.submit("play intro", &mut player, &mut console) == Flow::Exit {
//!     return;
//! }
//! player.tick(&mut console);
//!
//! for line in console.take_unread() {
//!     println!("{}", line);
//! }
//! ```

pub mod catalog;
pub mod command;
pub mod console;
mod error;
pub mod events;
pub mod history;
pub mod player;
pub mod queue;
pub mod session;
pub mod shuffle;
mod source;
pub mod types;

// Public exports
pub use catalog::{is_audio_file, Catalog};
pub use command::{Flow, Interpreter};
pub use console::{ConsoleBuffer, LineSink};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use history::InputHistory;
pub use player::{NowPlaying, Player};
pub use queue::{Advance, PlaylistQueue};
pub use session::PlaybackSession;
pub use source::{AudioEngine, Sound};
pub use types::{PlaybackConfig, PlaylistMode, TrackRef};
