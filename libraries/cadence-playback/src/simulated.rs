//! Clock-driven engine
//!
//! Plays nothing audible: position advances with the tokio clock and an end
//! timer reports `Ended` when the loaded item runs out. Used by the console
//! application and by tests running on paused time.

use crate::engine::{Engine, EngineEvent, EngineListener, EngineState};
use crate::error::{PlaybackError, Result};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Source error reported for URIs marked as failing
const ERROR_CODE_IO_FILE_NOT_FOUND: i32 = 2005;

/// Default length of items with no registered duration (3 minutes)
const DEFAULT_DURATION_MS: u64 = 180_000;

/// Engine simulated against the tokio clock
#[derive(Debug)]
pub struct SimulatedEngine {
    durations: HashMap<String, u64>,
    failing: HashSet<String>,
    default_duration_ms: u64,

    loaded: Option<String>,
    prepared: bool,
    duration_ms: u64,

    // Position at `started_at`, or the frozen position while paused
    base_position_ms: u64,
    // Set while play has been requested and not yet paused
    started_at: Option<Instant>,

    listener: Option<EngineListener>,
    end_timer: Option<JoinHandle<()>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self {
            durations: HashMap::new(),
            failing: HashSet::new(),
            default_duration_ms: DEFAULT_DURATION_MS,
            loaded: None,
            prepared: false,
            duration_ms: 0,
            base_position_ms: 0,
            started_at: None,
            listener: None,
            end_timer: None,
        }
    }

    /// Length used for URIs without a registered duration
    pub fn with_default_duration(mut self, duration_ms: u64) -> Self {
        self.default_duration_ms = duration_ms;
        self
    }

    /// Register the length of one stream
    pub fn with_duration(mut self, stream_uri: impl Into<String>, duration_ms: u64) -> Self {
        self.durations.insert(stream_uri.into(), duration_ms);
        self
    }

    /// Make preparing this stream fail with a source error
    pub fn with_failing(mut self, stream_uri: impl Into<String>) -> Self {
        self.failing.insert(stream_uri.into());
        self
    }

    pub fn loaded_uri(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(listener) = &self.listener {
            listener.emit(event);
        }
    }

    fn position_now(&self) -> u64 {
        let elapsed = self
            .started_at
            .map(|at| at.elapsed().as_millis() as u64)
            .unwrap_or(0);
        (self.base_position_ms + elapsed).min(self.duration_ms)
    }

    fn reached_end(&self) -> bool {
        self.prepared && self.position_now() >= self.duration_ms
    }

    fn cancel_end_timer(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }

    fn schedule_end_timer(&mut self) {
        self.cancel_end_timer();

        let (Some(listener), Ok(runtime)) = (
            self.listener.clone(),
            tokio::runtime::Handle::try_current(),
        ) else {
            return;
        };

        let remaining = Duration::from_millis(self.duration_ms.saturating_sub(self.position_now()));
        trace!(remaining_ms = remaining.as_millis() as u64, "Scheduling end of item");
        self.end_timer = Some(runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            listener.emit(EngineEvent::IsPlayingChanged(false));
            listener.emit(EngineEvent::PlaybackStateChanged(EngineState::Ended));
        }));
    }

    fn require_prepared(&self) -> Result<()> {
        if self.prepared {
            Ok(())
        } else {
            Err(PlaybackError::Configuration(
                "engine has no prepared media item".to_string(),
            ))
        }
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for SimulatedEngine {
    fn load(&mut self, stream_uri: &str) -> Result<()> {
        debug!(uri = %stream_uri, "Loading media item");
        self.cancel_end_timer();
        self.loaded = Some(stream_uri.to_string());
        self.prepared = false;
        self.duration_ms = 0;
        self.base_position_ms = 0;
        self.started_at = None;

        self.emit(EngineEvent::MediaItemTransitioned {
            uri: stream_uri.to_string(),
        });
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        let Some(uri) = self.loaded.clone() else {
            return Err(PlaybackError::Configuration(
                "nothing loaded to prepare".to_string(),
            ));
        };

        self.emit(EngineEvent::PlaybackStateChanged(EngineState::Buffering));
        if self.failing.contains(&uri) {
            // Source errors surface asynchronously, like a real player
            self.emit(EngineEvent::Error {
                code: ERROR_CODE_IO_FILE_NOT_FOUND,
                message: format!("Source error: cannot open {uri}"),
            });
            self.emit(EngineEvent::PlaybackStateChanged(EngineState::Idle));
            return Ok(());
        }

        self.duration_ms = self
            .durations
            .get(&uri)
            .copied()
            .unwrap_or(self.default_duration_ms);
        self.prepared = true;
        self.emit(EngineEvent::PlaybackStateChanged(EngineState::Ready));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.loaded.is_none() {
            return Err(PlaybackError::Configuration("nothing loaded to play".to_string()));
        }
        if !self.prepared || self.is_playing() || self.reached_end() {
            // Failed items and finished items stay silent until reloaded or sought
            return Ok(());
        }

        self.started_at = Some(Instant::now());
        self.schedule_end_timer();
        self.emit(EngineEvent::IsPlayingChanged(true));
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let was_playing = self.is_playing();
        self.base_position_ms = self.position_now();
        self.started_at = None;
        self.cancel_end_timer();

        if was_playing {
            self.emit(EngineEvent::IsPlayingChanged(false));
        }
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.require_prepared()?;

        let target = position_ms.min(self.duration_ms);
        if self.is_playing() {
            self.base_position_ms = target;
            self.started_at = Some(Instant::now());
            self.schedule_end_timer();
        } else {
            // Seeking out of the ended state leaves the item paused
            self.base_position_ms = target;
            self.started_at = None;
            self.cancel_end_timer();
        }
        Ok(())
    }

    fn current_position_ms(&self) -> u64 {
        if self.prepared {
            self.position_now()
        } else {
            0
        }
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some() && !self.reached_end()
    }

    fn set_listener(&mut self, listener: EngineListener) {
        self.listener = Some(listener);
    }

    fn release(&mut self) {
        debug!("Releasing simulated engine");
        self.cancel_end_timer();
        self.started_at = None;
        self.prepared = false;
        self.loaded = None;
        self.listener = None;
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.cancel_end_timer();
    }
}
