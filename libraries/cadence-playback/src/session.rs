//! Playback session: the single active sound and its transport state

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::source::{AudioEngine, Sound};
use crate::types::TrackRef;

/// Owns the active sound handle and its time bookkeeping
///
/// `is_playing` means a sound is instantiated, running or paused. `is_paused`
/// only carries meaning while `is_playing` is true.
#[derive(Default)]
pub struct PlaybackSession {
    sound: Option<Box<dyn Sound>>,

    /// Most recently loaded track; kept after `stop` so the playlist policies
    /// can continue from it
    track: Option<TrackRef>,

    playing: bool,
    paused: bool,

    total_frames: u64,
    total_seconds: f32,
    last_frame: u64,
}

impl PlaybackSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `track` and replace the active sound with it
    ///
    /// The new sound is loaded paused; call [`start`](Self::start) to begin
    /// output. On failure the session is left untouched.
    pub fn load(&mut self, engine: &mut dyn AudioEngine, track: TrackRef) -> Result<()> {
        let sound = engine.open(&track.path)?;

        tracing::info!(track = %track.name, path = %track.path.display(), "loaded track");

        self.total_frames = sound.length_frames();
        self.total_seconds = sound.length_seconds();
        self.last_frame = sound.cursor_frame();
        self.sound = Some(sound);
        self.track = Some(track);
        self.playing = true;
        self.paused = true;
        Ok(())
    }

    /// Begin (or resume) output of the loaded sound
    pub fn start(&mut self) -> Result<()> {
        let sound = self.sound.as_mut().ok_or_else(not_loaded)?;
        sound.start()?;
        self.paused = false;
        Ok(())
    }

    /// Halt output, keeping the cursor
    pub fn pause(&mut self) -> Result<()> {
        let sound = self.sound.as_mut().ok_or_else(not_loaded)?;
        sound.stop()?;
        self.paused = true;
        Ok(())
    }

    /// Resume output after [`pause`](Self::pause)
    pub fn resume(&mut self) -> Result<()> {
        self.start()
    }

    /// Release the sound and clear the transport flags
    pub fn stop(&mut self) {
        if let Some(mut sound) = self.sound.take() {
            if let Err(e) = sound.stop() {
                tracing::warn!("Failed to halt sound before release: {}", e);
            }
            tracing::debug!("released sound");
        }
        self.playing = false;
        self.paused = false;
    }

    /// Seek to `frame`
    ///
    /// Accepted only when `frame <= total_frames`; rejected seeks leave the
    /// cursor untouched.
    pub fn seek(&mut self, frame: u64) -> bool {
        self.try_seek(frame).is_ok()
    }

    fn try_seek(&mut self, frame: u64) -> Result<()> {
        if frame > self.total_frames {
            return Err(PlaybackError::InvalidSeekPosition(frame));
        }
        let sound = self.sound.as_mut().ok_or_else(not_loaded)?;
        sound.seek_to_frame(frame)
    }

    /// Seek to `seconds` at `sample_rate`
    ///
    /// Negative or non-finite targets are rejected like out-of-range frames.
    pub fn seek_seconds(&mut self, seconds: f32, sample_rate: u32) -> bool {
        let target = sample_rate as f64 * f64::from(seconds);
        if !target.is_finite() || target < 0.0 || target > self.total_frames as f64 {
            return false;
        }
        self.seek(target as u64)
    }

    /// Per-frame update
    ///
    /// Emits [`PlaybackEvent::EndOfTrack`] once when the cursor moves onto or
    /// past the last frame, or when the length shrinks onto a cursor that has
    /// already stopped there. While neither changes (e.g. paused at the end)
    /// nothing is emitted again.
    pub fn tick(&mut self) -> Option<PlaybackEvent> {
        if !self.playing {
            return None;
        }
        let sound = self.sound.as_ref()?;

        let total = sound.length_frames();
        let frame = sound.cursor_frame();
        self.total_seconds = sound.length_seconds();

        let changed = frame != self.last_frame || total != self.total_frames;
        self.total_frames = total;
        self.last_frame = frame;

        (changed && frame >= total).then_some(PlaybackEvent::EndOfTrack)
    }

    /// Whether a sound is instantiated (running or paused)
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the instantiated sound is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Most recently loaded track, if any
    pub fn track(&self) -> Option<&TrackRef> {
        self.track.as_ref()
    }

    /// Display name of the most recently loaded track (empty if none)
    pub fn track_name(&self) -> &str {
        self.track.as_ref().map_or("", |t| t.name.as_str())
    }

    /// Current cursor of the active sound
    pub fn cursor_frame(&self) -> u64 {
        self.sound.as_ref().map_or(0, |s| s.cursor_frame())
    }

    /// Frame observed by the last tick
    pub fn last_observed_frame(&self) -> u64 {
        self.last_frame
    }

    /// Length of the loaded sound in frames
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Length of the loaded sound in seconds
    pub fn total_seconds(&self) -> f32 {
        self.total_seconds
    }
}

fn not_loaded() -> PlaybackError {
    PlaybackError::InvalidArgument("no sound loaded".to_string())
}
