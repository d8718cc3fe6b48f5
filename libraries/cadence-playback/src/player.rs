//! Player - main playback orchestrator
//!
//! Owns the engine, the playback session, the playlist queue and the catalog,
//! and implements the three advance policies. All user-facing outcomes are
//! written to a [`LineSink`]; operations never fail across this boundary
//! except where a `Result` carries a validation error back to the caller.

use crate::catalog::Catalog;
use crate::console::LineSink;
use crate::error::Result;
use crate::events::PlaybackEvent;
use crate::queue::{Advance, PlaylistQueue};
use crate::session::PlaybackSession;
use crate::shuffle;
use crate::source::AudioEngine;
use crate::types::{PlaybackConfig, PlaylistMode, TrackRef};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::fmt;

const NOT_FOUND: &str = "Music query doesn't exist!";
const NO_MUSIC: &str = "No music to play. (Add some!)";
const END_OF_PLAYLIST: &str = "End of playlist!";

/// Main playback controller
///
/// Single-threaded: every method must be called from the tick/command loop.
pub struct Player {
    engine: Box<dyn AudioEngine>,
    session: PlaybackSession,
    queue: PlaylistQueue,
    catalog: Catalog,
    mode: PlaylistMode,
    looping: bool,
    rng: StdRng,
}

impl Player {
    /// Create a player over `engine` configured by `config`
    pub fn new(engine: Box<dyn AudioEngine>, config: &PlaybackConfig) -> Self {
        Self::with_rng(engine, config, StdRng::from_entropy())
    }

    /// Create a player with a deterministic shuffle sequence
    pub fn with_seed(engine: Box<dyn AudioEngine>, config: &PlaybackConfig, seed: u64) -> Self {
        Self::with_rng(engine, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut engine: Box<dyn AudioEngine>, config: &PlaybackConfig, rng: StdRng) -> Self {
        engine.set_volume(config.initial_volume);

        tracing::debug!(
            root = %config.music_root.display(),
            mode = %config.mode,
            looping = config.looping,
            "player initialized"
        );

        Self {
            engine,
            session: PlaybackSession::new(),
            queue: PlaylistQueue::new(),
            catalog: Catalog::new(&config.music_root),
            mode: config.mode,
            looping: config.looping,
            rng,
        }
    }

    // ===== Accessors =====

    /// Playback session (read-only)
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Playlist queue (read-only)
    pub fn queue(&self) -> &PlaylistQueue {
        &self.queue
    }

    /// Track catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether a sound is loaded (running or paused)
    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    /// Whether the loaded sound is paused
    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    /// Current advance policy
    pub fn mode(&self) -> PlaylistMode {
        self.mode
    }

    /// Switch advance policy; queue and cursor are untouched
    pub fn set_mode(&mut self, mode: PlaylistMode) {
        tracing::debug!(%mode, "playlist mode changed");
        self.mode = mode;
    }

    /// Whether queued mode wraps around
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Set queued-mode wrapping
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    // ===== Transport =====

    /// Stop current playback, resolve `query` and start it
    ///
    /// Returns whether a track is now playing.
    pub fn play_query(&mut self, query: &str, out: &mut dyn LineSink) -> bool {
        if self.session.is_playing() {
            self.session.stop();
        }

        let track = match self.catalog.resolve(query) {
            Ok(track) => track,
            Err(e) => {
                tracing::debug!("{}", e);
                out.error(NOT_FOUND);
                return false;
            }
        };

        match self.load_and_start(track, false) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to start track: {}", e);
                out.error(NOT_FOUND);
                false
            }
        }
    }

    /// Pause the loaded sound; already paused is a no-op
    pub fn pause(&mut self) -> Result<()> {
        if self.session.is_paused() {
            return Ok(());
        }
        self.session.pause()
    }

    /// Resume the loaded sound; already running is a no-op
    pub fn resume(&mut self) -> Result<()> {
        if !self.session.is_paused() {
            return Ok(());
        }
        self.session.resume()
    }

    /// Flip between paused and running
    pub fn toggle_pause(&mut self) -> Result<()> {
        if self.session.is_paused() {
            self.session.resume()
        } else {
            self.session.pause()
        }
    }

    /// Release the loaded sound
    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Seek to `seconds` into the loaded sound
    pub fn seek_seconds(&mut self, seconds: f32) -> bool {
        let rate = self.engine.sample_rate();
        self.session.seek_seconds(seconds, rate)
    }

    /// Current linear gain
    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Set linear gain, unclamped
    pub fn set_volume(&mut self, gain: f32) {
        self.engine.set_volume(gain);
    }

    /// Position as a fraction of the loaded sound, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        let total = self.session.total_frames();
        if !self.session.is_playing() || total == 0 {
            return 0.0;
        }
        (self.session.cursor_frame() as f64 / total as f64).clamp(0.0, 1.0) as f32
    }

    /// Seek to `fraction` of the loaded sound
    pub fn set_progress(&mut self, fraction: f32) -> bool {
        if !self.session.is_playing() || !fraction.is_finite() || fraction < 0.0 {
            return false;
        }
        let target = f64::from(fraction) * self.session.total_frames() as f64;
        self.session.seek(target.round() as u64)
    }

    /// Snapshot for a status line
    pub fn now_playing(&self) -> Option<NowPlaying> {
        if !self.session.is_playing() {
            return None;
        }
        let rate = f64::from(self.engine.sample_rate().max(1));
        Some(NowPlaying {
            name: self.session.track_name().to_string(),
            paused: self.session.is_paused(),
            position_seconds: (self.session.cursor_frame() as f64 / rate) as f32,
            total_seconds: self.session.total_seconds(),
            volume: self.engine.volume(),
        })
    }

    // ===== Playlist =====

    /// Stop current playback and advance per the current mode
    pub fn next(&mut self, out: &mut dyn LineSink) -> bool {
        let was_paused = self.session.is_paused();
        if self.session.is_playing() {
            self.session.stop();
        }
        self.advance(was_paused, out)
    }

    /// Load the next track per the current mode
    ///
    /// The new track starts unless `was_paused` is set, in which case it is
    /// left loaded and paused. Returns whether a track was loaded.
    pub fn advance(&mut self, was_paused: bool, out: &mut dyn LineSink) -> bool {
        tracing::debug!(mode = %self.mode, was_paused, "advancing playlist");
        match self.mode {
            PlaylistMode::Sequential => self.advance_sequential(was_paused, out),
            PlaylistMode::Shuffle => self.advance_shuffle(was_paused, out),
            PlaylistMode::Queued => match self.queue.advance(self.looping) {
                Advance::Moved(_) => self.play_queued(was_paused, out),
                Advance::EndOfPlaylist => {
                    out.info(END_OF_PLAYLIST);
                    false
                }
                Advance::Empty => {
                    out.warn("Empty playlist!");
                    false
                }
            },
        }
    }

    fn advance_sequential(&mut self, was_paused: bool, out: &mut dyn LineSink) -> bool {
        let tracks = self.catalog.sorted();
        if tracks.is_empty() {
            out.info(NO_MUSIC);
            return false;
        }

        let previous = self.session.track_name();
        let position = (!previous.is_empty())
            .then(|| tracks.iter().position(|t| t.name == previous))
            .flatten();

        let next = match position {
            Some(i) => match tracks.get(i + 1) {
                Some(track) => track.clone(),
                None => {
                    out.info(END_OF_PLAYLIST);
                    return false;
                }
            },
            None => match tracks.iter().min_by(|a, b| a.name.cmp(&b.name)) {
                Some(track) => track.clone(),
                None => return false,
            },
        };

        match self.load_and_start(next.clone(), was_paused) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", next.name, e);
                out.error(&format!("{} ({})", NOT_FOUND, next.name));
                false
            }
        }
    }

    fn advance_shuffle(&mut self, was_paused: bool, out: &mut dyn LineSink) -> bool {
        let current = self.session.track_name().to_string();
        let mut failed = HashSet::new();

        loop {
            let candidates = self.catalog.entries();
            let Some(track) = shuffle::pick(&mut self.rng, candidates, &current, &failed) else {
                if failed.is_empty() {
                    out.info(NO_MUSIC);
                } else {
                    out.error("No remaining track could be loaded, giving up on shuffle.");
                }
                return false;
            };

            match self.load_and_start(track.clone(), was_paused) {
                Ok(()) => return true,
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", track.name, e);
                    out.error("Failed to load next track, shuffling for new one.");
                    failed.insert(track.path);
                }
            }
        }
    }

    /// Load the cursor entry, skipping entries that fail to load
    ///
    /// Gives up after one full cycle of the queue.
    fn play_queued(&mut self, was_paused: bool, out: &mut dyn LineSink) -> bool {
        let Some(start) = self.queue.cursor() else {
            return false;
        };

        for _ in 0..self.queue.len() {
            let Some(track) = self.queue.current().cloned() else {
                return false;
            };

            match self.load_and_start(track.clone(), was_paused) {
                Ok(()) => return true,
                Err(e) => {
                    tracing::warn!("Failed to load queued {}: {}", track.name, e);
                    out.error(&format!(
                        "Couldn't load next music track in queue, skipping! ({})",
                        track.name
                    ));
                }
            }

            match self.queue.advance(self.looping) {
                Advance::Moved(i) if i != start => {}
                Advance::EndOfPlaylist => {
                    out.info(END_OF_PLAYLIST);
                    return false;
                }
                _ => return false,
            }
        }

        false
    }

    /// Point the queue cursor at `index` (0-based) and play it
    ///
    /// Nothing is reloaded when the cursor already points there. The pause
    /// state of the current sound carries over to the new one.
    pub fn set_position(&mut self, index: usize, out: &mut dyn LineSink) -> Result<()> {
        if self.queue.set_cursor(index)? {
            let was_paused = self.session.is_paused();
            if self.session.is_playing() {
                self.session.stop();
            }
            self.play_queued(was_paused, out);
        }
        Ok(())
    }

    /// Remove the queue entry at `index` (0-based)
    ///
    /// Removing the cursor entry reloads whatever the cursor moved to, or
    /// stops playback when the queue is now empty.
    pub fn remove(&mut self, index: usize, out: &mut dyn LineSink) -> Result<TrackRef> {
        let removal = self.queue.remove(index)?;

        if removal.was_current {
            let was_paused = self.session.is_paused();
            if self.session.is_playing() {
                self.session.stop();
            }
            if self.queue.current().is_some() {
                self.play_queued(was_paused, out);
            }
        }

        Ok(removal.track)
    }

    /// Resolve `query` and append it to the queue
    pub fn push(&mut self, query: &str) -> Result<TrackRef> {
        let track = self.catalog.resolve(query)?;
        self.queue.push(track.clone());
        Ok(track)
    }

    /// Empty the queue; playback continues
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // ===== Loop =====

    /// Per-frame update
    ///
    /// At end of track the next track is loaded per the current mode. When
    /// the music root has disappeared the finished track is rewound and left
    /// paused instead.
    pub fn tick(&mut self, out: &mut dyn LineSink) -> Option<PlaybackEvent> {
        let event = self.session.tick()?;
        tracing::debug!(track = %self.session.track_name(), "end of track");

        if !self.catalog.exists() {
            self.session.seek(0);
            if let Err(e) = self.session.pause() {
                tracing::warn!("Failed to pause finished track: {}", e);
            }
            return Some(PlaybackEvent::Rewound);
        }

        if self.next(out) {
            Some(PlaybackEvent::TrackChanged {
                name: self.session.track_name().to_string(),
            })
        } else {
            Some(event)
        }
    }

    /// Stop playback before the engine is released
    pub fn shutdown(&mut self) {
        if self.session.is_playing() {
            self.session.stop();
        }
        tracing::debug!("player shut down");
    }

    fn load_and_start(&mut self, track: TrackRef, paused: bool) -> Result<()> {
        self.session.load(self.engine.as_mut(), track)?;
        if !paused {
            if let Err(e) = self.session.start() {
                self.session.stop();
                return Err(e);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("track", &self.session.track_name())
            .field("playing", &self.session.is_playing())
            .field("paused", &self.session.is_paused())
            .field("mode", &self.mode)
            .field("looping", &self.looping)
            .field("queue_len", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Status snapshot of the loaded track
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    /// Display name
    pub name: String,
    /// Whether output is paused
    pub paused: bool,
    /// Cursor position in seconds
    pub position_seconds: f32,
    /// Track length in seconds
    pub total_seconds: f32,
    /// Engine gain
    pub volume: f32,
}

impl fmt::Display for NowPlaying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.paused { '#' } else { '>' };
        let whole = self.total_seconds.max(0.0) as u64;
        write!(
            f,
            "{} {}  {:.1} / {:.1} ({}min {}s)  {:.2}v",
            marker,
            self.name,
            self.position_seconds,
            self.total_seconds,
            whole / 60,
            whole % 60,
            self.volume
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleBuffer;
    use crate::error::PlaybackError;
    use crate::source::scripted::{ScriptedEngine, LENGTH_FRAMES};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_player(files: &[&str]) -> (TempDir, ScriptedEngine, Player) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("music");
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"fake audio").unwrap();
        }
        let engine = ScriptedEngine::new();
        let config = PlaybackConfig {
            music_root: root,
            ..PlaybackConfig::default()
        };
        let player = Player::with_seed(Box::new(engine.clone()), &config, 42);
        (temp, engine, player)
    }

    fn loaded_name(engine: &ScriptedEngine) -> String {
        engine
            .current_path()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default()
    }

    fn music_path(temp: &TempDir, file: &str) -> std::path::PathBuf {
        temp.path().join("music").join(file)
    }

    #[test]
    fn play_query_starts_track() {
        let (_temp, engine, mut player) = create_test_player(&["Intro.mp3"]);
        let mut out = ConsoleBuffer::new();

        assert!(player.play_query("intro", &mut out));
        assert!(player.is_playing());
        assert!(!player.is_paused());
        assert!(engine.is_running());
        assert_eq!(out.lines().len(), 1);
    }

    #[test]
    fn play_query_start_failure_leaves_nothing_loaded() {
        let (temp, engine, mut player) = create_test_player(&["Intro.mp3"]);
        engine.break_start(music_path(&temp, "Intro.mp3"));
        let mut out = ConsoleBuffer::new();

        assert!(!player.play_query("intro", &mut out));
        assert!(!player.is_playing());
        assert!(!player.is_paused());
        assert!(engine.state.borrow().current.as_ref().unwrap().borrow().released);
        assert_eq!(out.count_prefixed("[log.error]"), 1);
    }

    #[test]
    fn play_query_not_found_leaves_nothing_loaded() {
        let (_temp, _engine, mut player) = create_test_player(&["Intro.mp3"]);
        let mut out = ConsoleBuffer::new();

        player.play_query("intro", &mut out);
        assert!(!player.play_query("zzz", &mut out));
        assert!(!player.is_playing());
        assert_eq!(out.count_prefixed("[log.error]"), 1);
    }

    #[test]
    fn redundant_pause_and_resume_are_noops() {
        let (_temp, engine, mut player) = create_test_player(&["Intro.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.play_query("intro", &mut out);

        player.resume().unwrap();
        assert!(engine.is_running());
        player.pause().unwrap();
        player.pause().unwrap();
        assert!(player.is_paused());
        player.toggle_pause().unwrap();
        assert!(!player.is_paused());
    }

    #[test]
    fn sequential_advances_by_path_order() {
        let (_temp, engine, mut player) = create_test_player(&["b.mp3", "a.mp3", "c.mp3"]);
        let mut out = ConsoleBuffer::new();

        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "a");
        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "b");
        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "c");

        assert!(!player.next(&mut out));
        assert_eq!(out.lines().last().unwrap(), "[log.info] End of playlist!");
        assert!(!player.is_playing());
    }

    #[test]
    fn sequential_on_empty_catalog() {
        let (_temp, _engine, mut player) = create_test_player(&[]);
        let mut out = ConsoleBuffer::new();

        assert!(!player.next(&mut out));
        assert_eq!(
            out.lines().last().unwrap(),
            "[log.info] No music to play. (Add some!)"
        );
    }

    #[test]
    fn next_preserves_pause_state() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();

        player.play_query("a", &mut out);
        player.pause().unwrap();
        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "b");
        assert!(player.is_playing());
        assert!(player.is_paused());
        assert!(!engine.is_running());
    }

    #[test]
    fn shuffle_never_repeats_current() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Shuffle);

        player.play_query("a", &mut out);
        for _ in 0..20 {
            let before = loaded_name(&engine);
            assert!(player.next(&mut out));
            assert_ne!(loaded_name(&engine), before);
        }
    }

    #[test]
    fn shuffle_with_only_current_track() {
        let (_temp, _engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Shuffle);

        player.play_query("a", &mut out);
        assert!(!player.next(&mut out));
        assert_eq!(
            out.lines().last().unwrap(),
            "[log.info] No music to play. (Add some!)"
        );
    }

    #[test]
    fn shuffle_skips_broken_files_and_terminates() {
        let (temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Shuffle);
        engine.break_file(music_path(&temp, "b.mp3"));

        player.play_query("a", &mut out);
        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "c");

        // Everything but the current track is broken
        engine.break_file(music_path(&temp, "a.mp3"));
        let failures = out.count_prefixed("[log.error] Failed to load next track");
        assert!(!player.next(&mut out));
        assert_eq!(
            out.count_prefixed("[log.error] Failed to load next track"),
            failures + 2
        );
        assert!(out
            .lines()
            .last()
            .unwrap()
            .starts_with("[log.error] No remaining track"));
    }

    #[test]
    fn queued_mode_walks_queue() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Queued);
        player.push("b").unwrap();
        player.push("a").unwrap();

        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "b");
        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "a");
        assert!(!player.next(&mut out));
        assert_eq!(out.lines().last().unwrap(), "[log.info] End of playlist!");

        player.set_looping(true);
        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "b");
    }

    #[test]
    fn queued_mode_on_empty_queue() {
        let (_temp, _engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Queued);

        assert!(!player.next(&mut out));
        assert_eq!(out.lines().last().unwrap(), "[log.warn] Empty playlist!");
    }

    #[test]
    fn queued_retry_stops_after_full_cycle() {
        let (temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Queued);
        player.set_looping(true);
        player.push("a").unwrap();
        player.push("b").unwrap();
        engine.break_file(music_path(&temp, "a.mp3"));
        engine.break_file(music_path(&temp, "b.mp3"));

        assert!(!player.next(&mut out));
        assert_eq!(out.count_prefixed("[log.error] Couldn't load"), 2);
        assert!(!player.is_playing());
    }

    #[test]
    fn queued_retry_skips_to_loadable_entry() {
        let (temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.set_mode(PlaylistMode::Queued);
        player.push("a").unwrap();
        player.push("b").unwrap();
        engine.break_file(music_path(&temp, "a.mp3"));

        assert!(player.next(&mut out));
        assert_eq!(loaded_name(&engine), "b");
        assert_eq!(player.queue().cursor(), Some(1));
    }

    #[test]
    fn set_position_reloads_only_on_change() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.push("a").unwrap();
        player.push("b").unwrap();

        player.set_position(1, &mut out).unwrap();
        assert_eq!(loaded_name(&engine), "b");
        let opened = engine.state.borrow().opened.len();

        player.set_position(1, &mut out).unwrap();
        assert_eq!(engine.state.borrow().opened.len(), opened);

        assert!(player.set_position(5, &mut out).is_err());
        assert_eq!(player.queue().cursor(), Some(1));
    }

    #[test]
    fn set_position_keeps_pause_state() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.push("a").unwrap();
        player.push("b").unwrap();

        player.set_position(0, &mut out).unwrap();
        player.pause().unwrap();
        player.set_position(1, &mut out).unwrap();
        assert_eq!(loaded_name(&engine), "b");
        assert!(player.is_paused());
    }

    #[test]
    fn remove_current_reloads_next_entry() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.push("a").unwrap();
        player.push("b").unwrap();
        player.set_position(0, &mut out).unwrap();

        let removed = player.remove(0, &mut out).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(loaded_name(&engine), "b");
        assert_eq!(player.queue().cursor(), Some(0));
        assert!(player.is_playing());
    }

    #[test]
    fn remove_last_entry_stops_playback() {
        let (_temp, _engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.push("a").unwrap();
        player.set_position(0, &mut out).unwrap();

        player.remove(0, &mut out).unwrap();
        assert!(player.queue().is_empty());
        assert_eq!(player.queue().cursor(), None);
        assert!(!player.is_playing());
    }

    #[test]
    fn push_unresolved_query_is_rejected() {
        let (_temp, _engine, mut player) = create_test_player(&["a.mp3"]);
        assert!(matches!(player.push("zzz"), Err(PlaybackError::NotFound(_))));
        assert!(player.queue().is_empty());
    }

    #[test]
    fn end_of_track_advances() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3", "b.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.play_query("a", &mut out);

        engine.set_cursor(LENGTH_FRAMES);
        assert_eq!(
            player.tick(&mut out),
            Some(PlaybackEvent::TrackChanged {
                name: "b".to_string()
            })
        );
        assert!(engine.is_running());
        assert_eq!(player.tick(&mut out), None);
    }

    #[test]
    fn end_of_last_track_reports_end() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.play_query("a", &mut out);

        engine.set_cursor(LENGTH_FRAMES);
        assert_eq!(player.tick(&mut out), Some(PlaybackEvent::EndOfTrack));
        assert!(!player.is_playing());
    }

    #[test]
    fn end_of_track_without_root_rewinds() {
        let (temp, engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.play_query("a", &mut out);
        fs::remove_dir_all(temp.path().join("music")).unwrap();

        engine.set_cursor(LENGTH_FRAMES);
        assert_eq!(player.tick(&mut out), Some(PlaybackEvent::Rewound));
        assert!(player.is_playing());
        assert!(player.is_paused());
        assert_eq!(player.session().cursor_frame(), 0);
    }

    #[test]
    fn progress_round_trip() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        assert_eq!(player.progress(), 0.0);
        assert!(!player.set_progress(0.5));

        player.play_query("a", &mut out);
        assert!(player.set_progress(0.25));
        assert_eq!(player.session().cursor_frame(), LENGTH_FRAMES / 4);
        assert!((player.progress() - 0.25).abs() < 1e-6);

        assert!(!player.set_progress(1.5));
        engine.set_cursor(LENGTH_FRAMES);
        assert_eq!(player.progress(), 1.0);
    }

    #[test]
    fn initial_volume_is_applied() {
        let temp = TempDir::new().unwrap();
        let engine = ScriptedEngine::new();
        let config = PlaybackConfig {
            music_root: temp.path().to_path_buf(),
            initial_volume: 0.25,
            ..PlaybackConfig::default()
        };
        let mut player = Player::new(Box::new(engine.clone()), &config);
        assert_eq!(player.volume(), 0.25);
        player.set_volume(1.5);
        assert_eq!(engine.state.borrow().volume, 1.5);
    }

    #[test]
    fn now_playing_status_line() {
        let status = NowPlaying {
            name: "Intro".to_string(),
            paused: false,
            position_seconds: 12.34,
            total_seconds: 180.0,
            volume: 1.0,
        };
        assert_eq!(status.to_string(), "> Intro  12.3 / 180.0 (3min 0s)  1.00v");

        let paused = NowPlaying { paused: true, ..status };
        assert!(paused.to_string().starts_with("# Intro"));
    }

    #[test]
    fn shutdown_releases_sound() {
        let (_temp, engine, mut player) = create_test_player(&["a.mp3"]);
        let mut out = ConsoleBuffer::new();
        player.play_query("a", &mut out);
        player.shutdown();
        assert!(!player.is_playing());
        assert!(engine.state.borrow().current.as_ref().unwrap().borrow().released);
        assert!(engine.current_path().unwrap().ends_with("a.mp3"));
    }
}
