/// Console configuration
use crate::error::{ConsoleError, Result};
use cadence_playback::{PlaybackConfig, RepeatMode, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_position_poll_interval_ms")]
    pub position_poll_interval_ms: u64,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_step_ms")]
    pub retry_step_ms: u64,

    #[serde(default = "default_max_play_retries")]
    pub max_play_retries: u32,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    #[serde(default)]
    pub initial_repeat: RepeatMode,

    #[serde(default)]
    pub initial_shuffle: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// JSON track list; the bundled sample catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Length given to tracks whose catalog entry has no duration
    #[serde(default = "default_track_ms")]
    pub default_track_ms: u64,
}

impl AppConfig {
    /// Load configuration from `cadence.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE), false)
    }

    /// Load configuration from `path` and environment
    ///
    /// A missing file is an error only when `required` is set.
    pub fn load_from(path: &Path, required: bool) -> Result<Self> {
        if required && !path.exists() {
            return Err(ConsoleError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        // Override with environment variables, e.g. CADENCE_PLAYBACK__MAX_PLAY_RETRIES
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.position_poll_interval_ms == 0 {
            return Err(ConsoleError::Config(
                "playback.position_poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.playback.event_capacity == 0 {
            return Err(ConsoleError::Config(
                "playback.event_capacity must be greater than 0".to_string(),
            ));
        }

        if self.engine.default_track_ms == 0 {
            return Err(ConsoleError::Config(
                "engine.default_track_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(path) = &self.catalog.path {
            if !path.exists() {
                return Err(ConsoleError::Config(format!(
                    "catalog file not found at {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Settings for the playback library
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            position_poll_interval_ms: self.playback.position_poll_interval_ms,
            retry: RetryPolicy {
                base_delay_ms: self.playback.retry_base_delay_ms,
                step_ms: self.playback.retry_step_ms,
                max_retries: self.playback.max_play_retries,
            },
            event_capacity: self.playback.event_capacity,
            shuffle_seed: self.playback.shuffle_seed,
            initial_shuffle: self.playback.initial_shuffle,
            initial_repeat: self.playback.initial_repeat,
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            position_poll_interval_ms: default_position_poll_interval_ms(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_step_ms: default_retry_step_ms(),
            max_play_retries: default_max_play_retries(),
            event_capacity: default_event_capacity(),
            shuffle_seed: None,
            initial_repeat: RepeatMode::Off,
            initial_shuffle: false,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_track_ms: default_track_ms(),
        }
    }
}

// Default values
fn default_position_poll_interval_ms() -> u64 {
    1000
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_step_ms() -> u64 {
    500
}

fn default_max_play_retries() -> u32 {
    3
}

fn default_event_capacity() -> usize {
    64
}

fn default_track_ms() -> u64 {
    180_000
}
