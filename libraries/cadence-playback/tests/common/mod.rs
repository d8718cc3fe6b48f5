//! Shared helpers for playback integration tests

#![allow(dead_code)]

use cadence_playback::{
    AudioEngine, ConsoleBuffer, Interpreter, PlaybackConfig, PlaybackError, Player, Result, Sound,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

pub const SAMPLE_RATE: u32 = 48_000;
pub const LENGTH_SECONDS: u64 = 10;
pub const LENGTH_FRAMES: u64 = SAMPLE_RATE as u64 * LENGTH_SECONDS;

#[derive(Debug, Default)]
struct SoundState {
    cursor: u64,
    running: bool,
}

#[derive(Debug, Default)]
struct EngineState {
    volume: f32,
    broken: HashSet<PathBuf>,
    current: Option<Rc<RefCell<SoundState>>>,
}

/// In-memory engine whose sounds expose a controllable frame cursor
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Rc<RefCell<EngineState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        let engine = Self::default();
        engine.state.borrow_mut().volume = 1.0;
        engine
    }

    /// Make every future `open` of `path` fail
    pub fn break_file(&self, path: impl Into<PathBuf>) {
        self.state.borrow_mut().broken.insert(path.into());
    }

    /// Move the cursor of the most recently opened sound
    pub fn set_cursor(&self, frame: u64) {
        if let Some(sound) = &self.state.borrow().current {
            sound.borrow_mut().cursor = frame;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state
            .borrow()
            .current
            .as_ref()
            .is_some_and(|s| s.borrow().running)
    }
}

struct FakeSound {
    state: Rc<RefCell<SoundState>>,
}

impl Drop for FakeSound {
    fn drop(&mut self) {
        self.state.borrow_mut().running = false;
    }
}

impl Sound for FakeSound {
    fn start(&mut self) -> Result<()> {
        self.state.borrow_mut().running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.state.borrow_mut().running = false;
        Ok(())
    }

    fn seek_to_frame(&mut self, frame: u64) -> Result<()> {
        self.state.borrow_mut().cursor = frame;
        Ok(())
    }

    fn cursor_frame(&self) -> u64 {
        self.state.borrow().cursor
    }

    fn length_frames(&self) -> u64 {
        LENGTH_FRAMES
    }

    fn length_seconds(&self) -> f32 {
        LENGTH_SECONDS as f32
    }
}

impl AudioEngine for FakeEngine {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn open(&mut self, path: &Path) -> Result<Box<dyn Sound>> {
        let mut engine = self.state.borrow_mut();
        if engine.broken.contains(path) {
            return Err(PlaybackError::decode(path, "fake decode failure"));
        }
        let state = Rc::new(RefCell::new(SoundState::default()));
        engine.current = Some(Rc::clone(&state));
        Ok(Box::new(FakeSound { state }))
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, gain: f32) {
        self.state.borrow_mut().volume = gain;
    }
}

/// Temp music directory, engine, player, interpreter and console
pub struct Harness {
    pub temp: TempDir,
    pub engine: FakeEngine,
    pub player: Player,
    pub interpreter: Interpreter,
    pub console: ConsoleBuffer,
}

impl Harness {
    /// Create a harness whose `music/` holds one empty file per name
    pub fn with_tracks(files: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("music");
        fs::create_dir_all(&root).unwrap();
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"not really audio").unwrap();
        }

        let engine = FakeEngine::new();
        let config = PlaybackConfig {
            music_root: root,
            ..PlaybackConfig::default()
        };
        let mut console = ConsoleBuffer::new();
        console.take_unread();

        Self {
            temp,
            player: Player::with_seed(Box::new(engine.clone()), &config, 0xcade),
            engine,
            interpreter: Interpreter::default(),
            console,
        }
    }

    pub fn music_path(&self, file: &str) -> PathBuf {
        self.temp.path().join("music").join(file)
    }

    /// Submit one line and return the console entries it produced
    pub fn run(&mut self, line: &str) -> Vec<String> {
        self.interpreter
            .submit(line, &mut self.player, &mut self.console);
        self.console.take_unread()
    }

    /// Tick once and return the console entries it produced
    pub fn tick(&mut self) -> Vec<String> {
        self.player.tick(&mut self.console);
        self.console.take_unread()
    }

    pub fn current_name(&self) -> &str {
        self.player.session().track_name()
    }
}

/// Count entries carrying the error prefix
pub fn errors(lines: &[String]) -> usize {
    lines.iter().filter(|l| l.starts_with("[log.error]")).count()
}
