//! Platform-agnostic audio engine traits
//!
//! Abstracts the audio device and file decoding so the player can run against
//! CPAL on desktop or a scripted engine in tests.

use crate::error::Result;
use std::path::Path;

/// A decoded file attached to the engine
///
/// Frame counts are expressed at the engine sample rate. Dropping the handle
/// detaches it from the device and releases its decoder.
pub trait Sound {
    /// Start (or restart after `stop`) output of this sound
    fn start(&mut self) -> Result<()>;

    /// Halt output while keeping the cursor, so `start` resumes in place
    fn stop(&mut self) -> Result<()>;

    /// Move the cursor to `frame`
    ///
    /// Callers validate `frame <= length_frames()`.
    fn seek_to_frame(&mut self, frame: u64) -> Result<()>;

    /// Current cursor position in frames
    fn cursor_frame(&self) -> u64;

    /// Total length in frames
    ///
    /// May be refined while decoding when the container does not declare it.
    fn length_frames(&self) -> u64;

    /// Total length in seconds
    fn length_seconds(&self) -> f32;
}

/// Output device plus decoder factory
pub trait AudioEngine {
    /// Output sample rate used for all frame arithmetic
    fn sample_rate(&self) -> u32;

    /// Open and decode the header of `path`
    ///
    /// The returned sound is loaded but not started.
    fn open(&mut self, path: &Path) -> Result<Box<dyn Sound>>;

    /// Current linear gain
    fn volume(&self) -> f32;

    /// Set linear gain; values above 1.0 amplify and are not clamped
    fn set_volume(&mut self, gain: f32);
}
