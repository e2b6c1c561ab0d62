//! Core types for playback management

use cadence_core::Track;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the fixed Off → All → One → Off cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        };
        f.write_str(name)
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RepeatMode::Off),
            "all" => Ok(RepeatMode::All),
            "one" => Ok(RepeatMode::One),
            other => Err(format!("unknown repeat mode '{other}' (expected off, all or one)")),
        }
    }
}

/// Navigation direction through the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Backoff used when a play command is issued before the session is bound
///
/// Attempt `n` (starting at 0) waits `base_delay_ms + n * step_ms` before
/// checking the connection again; after `max_retries` further attempts the
/// command fails with a connection error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first check (default: 500ms)
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Added per attempt (default: 500ms)
    #[serde(default = "default_retry_step_ms")]
    pub step_ms: u64,

    /// Retries after the first check (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Wait before `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms + u64::from(attempt) * self.step_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: default_retry_base_delay_ms(),
            step_ms: default_retry_step_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Configuration for the playback session and its connectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Position poll interval while playing (default: 1000ms)
    #[serde(default = "default_position_poll_interval_ms")]
    pub position_poll_interval_ms: u64,

    /// Retry schedule for play-before-connected
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Session event broadcast capacity (default: 64)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Fixed seed for shuffle picks; random when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// Initial shuffle state (default: false)
    #[serde(default)]
    pub initial_shuffle: bool,

    /// Initial repeat mode (default: Off)
    #[serde(default)]
    pub initial_repeat: RepeatMode,
}

impl PlaybackConfig {
    pub fn position_poll_interval(&self) -> Duration {
        Duration::from_millis(self.position_poll_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            position_poll_interval_ms: default_position_poll_interval_ms(),
            retry: RetryPolicy::default(),
            event_capacity: default_event_capacity(),
            shuffle_seed: None,
            initial_shuffle: false,
            initial_repeat: RepeatMode::Off,
        }
    }
}

fn default_position_poll_interval_ms() -> u64 {
    1000
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_step_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    3
}

fn default_event_capacity() -> usize {
    64
}

/// Point-in-time view of a session, for late subscribers and notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub track: Option<Track>,
    pub index: Option<usize>,
    pub queue_len: usize,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}
