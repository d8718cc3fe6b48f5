/// CLI configuration
use crate::error::{CliError, Result};
use cadence_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File read when `--config` is not given, if present
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

/// Environment prefix; nested keys use `__`, e.g. `CADENCE_PLAYBACK__MUSIC_ROOT`
pub const ENV_PREFIX: &str = "CADENCE";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeSettings {
    /// Main loop ticks per second
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

/// Values given on the command line; they win over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub music_dir: Option<PathBuf>,
    pub volume: Option<f32>,
    pub tick_rate: Option<u32>,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cadence.toml` in the working
    /// directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Like [`CliConfig::load`] but with an explicit environment map
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Apply command-line values on top of the loaded layers
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(dir) = &overrides.music_dir {
            self.playback.music_root.clone_from(dir);
        }
        if let Some(volume) = overrides.volume {
            self.playback.initial_volume = volume;
        }
        if let Some(tick_rate) = overrides.tick_rate {
            self.runtime.tick_rate = tick_rate;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.runtime.tick_rate == 0 {
            return Err(CliError::Config(
                "tick_rate must be at least 1 (set CADENCE_RUNTIME__TICK_RATE)".to_string(),
            ));
        }

        if !self.playback.initial_volume.is_finite() {
            return Err(CliError::Config(format!(
                "initial_volume must be a finite number, got {}",
                self.playback.initial_volume
            )));
        }

        if !self.playback.music_root.is_dir() {
            tracing::warn!(
                "Music directory {} does not exist yet",
                self.playback.music_root.display()
            );
        }

        Ok(())
    }
}

fn default_tick_rate() -> u32 {
    30
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
        }
    }
}
