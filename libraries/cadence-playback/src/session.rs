//! Playback session - background orchestration
//!
//! Owns the engine, the queue and the transport state. Every mutation happens
//! through `&mut self`, so whoever drives the session (normally the task
//! spawned by [`crate::SessionHost`]) serialises commands and engine callbacks.
//! Events are buffered and published by the driver via [`PlaybackSession::drain_events`].

use crate::{
    engine::{Engine, EngineEvent, EngineState},
    error::{PlaybackError, Result},
    events::{SessionCommand, SessionEvent},
    notification::{NotificationAction, NotificationState, NotificationSurface},
    queue::Queue,
    transport::{EndOfTrack, TransportState},
    types::{PlaybackConfig, RepeatMode, SessionSnapshot},
};
use cadence_core::Track;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

/// Error code used when a synchronous engine failure carries none
const ERROR_CODE_UNSPECIFIED: i32 = 1000;

/// Single playback session
pub struct PlaybackSession<E: Engine> {
    engine: E,
    queue: Queue,
    transport: TransportState,
    notifier: Box<dyn NotificationSurface>,
    rng: StdRng,

    // Last track ended with nothing to advance to
    finished: bool,

    // Notification shown; cleared by stop/release until playback resumes
    surface_active: bool,

    released: bool,

    // Event queue for the host to publish
    pending_events: Vec<SessionEvent>,
}

impl<E: Engine> PlaybackSession<E> {
    /// Create a session around an engine whose listener is already set
    pub fn new(engine: E, notifier: Box<dyn NotificationSurface>, config: &PlaybackConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            engine,
            queue: Queue::empty(),
            transport: TransportState::new(config.initial_shuffle, config.initial_repeat),
            notifier,
            rng,
            finished: false,
            surface_active: false,
            released: false,
            pending_events: Vec::new(),
        }
    }

    // ===== Commands =====

    /// Apply one command; failures were already surfaced as events
    pub fn apply(&mut self, command: SessionCommand) -> Result<()> {
        trace!(?command, "Applying command");
        match command {
            SessionCommand::PlayQueue(queue) => self.play_queue(queue),
            SessionCommand::PlayPause => self.play_pause(),
            SessionCommand::Play => self.play(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Next => self.next().map(|_| ()),
            SessionCommand::Previous => self.previous().map(|_| ()),
            SessionCommand::SeekTo(position_ms) => self.seek_to(position_ms).map(|_| ()),
            SessionCommand::ToggleShuffle => {
                self.toggle_shuffle();
                Ok(())
            }
            SessionCommand::ToggleRepeat => {
                self.toggle_repeat();
                Ok(())
            }
            SessionCommand::SetShuffle(enabled) => {
                self.set_shuffle(enabled);
                Ok(())
            }
            SessionCommand::SetRepeat(mode) => {
                self.set_repeat(mode);
                Ok(())
            }
            SessionCommand::Notification(action) => self.handle_notification_action(action),
        }
    }

    /// Replace the queue and start playing its current track
    pub fn play_queue(&mut self, queue: Queue) -> Result<()> {
        if queue.is_empty() {
            return Err(PlaybackError::Configuration(
                "cannot play an empty queue".to_string(),
            ));
        }

        info!(tracks = queue.len(), index = ?queue.current_index(), "Playing new queue");
        self.queue = queue;
        self.load_current()
    }

    /// Toggle between playing and paused, as the engine currently sees it
    pub fn play_pause(&mut self) -> Result<()> {
        if self.engine.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Start or resume playback of the current track
    pub fn play(&mut self) -> Result<()> {
        if self.queue.current().is_none() {
            debug!("Play requested with empty queue, ignoring");
            return Ok(());
        }

        if self.finished {
            // Replay the last track rather than sit at its end
            self.finished = false;
            let rewind = self.engine.seek_to(0);
            self.surface(rewind)?;
            self.transport.set_position(0);
        }

        self.surface_active = true;
        let result = self.engine.play();
        self.surface(result)
    }

    pub fn pause(&mut self) -> Result<()> {
        let result = self.engine.pause();
        self.surface(result)
    }

    /// Pause, rewind to 0 and take down the notification
    pub fn stop(&mut self) -> Result<()> {
        if self.queue.current().is_none() {
            return Ok(());
        }

        info!("Stopping playback");
        let result = self.engine.pause().and_then(|()| self.engine.seek_to(0));
        self.surface(result)?;

        self.transport.set_position(0);
        self.surface_active = false;
        self.notifier.clear();
        self.emit(SessionEvent::Stopped);
        Ok(())
    }

    /// Move to the next track; `Ok(false)` when at a boundary
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<bool> {
        match self.transport.resolve_next(&self.queue, &mut self.rng) {
            Some(index) => self.move_to(index).map(|()| true),
            None => {
                debug!("Already at end of queue");
                Ok(false)
            }
        }
    }

    /// Move to the previous track; `Ok(false)` when at a boundary
    pub fn previous(&mut self) -> Result<bool> {
        match self.transport.resolve_previous(&self.queue, &mut self.rng) {
            Some(index) => self.move_to(index).map(|()| true),
            None => {
                debug!("Already at start of queue");
                Ok(false)
            }
        }
    }

    /// Seek within the current track, returning the clamped target
    pub fn seek_to(&mut self, position_ms: i64) -> Result<u64> {
        if self.queue.current().is_none() {
            return Ok(0);
        }

        let target = self.transport.clamp_seek(position_ms);
        debug!(requested = position_ms, target, "Seeking");
        let result = self.engine.seek_to(target);
        self.surface(result)?;

        self.finished = false;
        self.transport.set_position(target);
        self.emit_position();
        Ok(target)
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.transport.toggle_shuffle();
        debug!(enabled, "Shuffle toggled");
        self.emit(SessionEvent::ShuffleChanged { enabled });
        self.emit_navigation();
        enabled
    }

    pub fn toggle_repeat(&mut self) -> RepeatMode {
        let mode = self.transport.toggle_repeat();
        debug!(%mode, "Repeat toggled");
        self.emit(SessionEvent::RepeatChanged { mode });
        self.emit_navigation();
        mode
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.transport.shuffle_enabled() != enabled {
            self.toggle_shuffle();
        }
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.transport.repeat_mode() != mode {
            self.transport.set_repeat(mode);
            self.emit(SessionEvent::RepeatChanged { mode });
            self.emit_navigation();
        }
    }

    /// Action raised from the notification surface
    pub fn handle_notification_action(&mut self, action: NotificationAction) -> Result<()> {
        debug!(%action, "Notification action");
        match action {
            NotificationAction::PlayPause => self.play_pause(),
            NotificationAction::Previous => self.previous().map(|_| ()),
            NotificationAction::Next => self.next().map(|_| ()),
            NotificationAction::Stop => self.stop(),
        }
    }

    // ===== Engine Callbacks =====

    /// React to an engine lifecycle event
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::IsPlayingChanged(is_playing) => {
                if self.transport.set_playing(is_playing) {
                    debug!(is_playing, "Engine play state changed");
                    if is_playing {
                        self.finished = false;
                    }
                    self.emit(SessionEvent::PlayingChanged { is_playing });
                }
            }
            EngineEvent::PlaybackStateChanged(EngineState::Ready) => self.refresh_duration(),
            EngineEvent::PlaybackStateChanged(EngineState::Ended) => {
                // Errors are already surfaced as events
                self.on_track_ended().ok();
            }
            EngineEvent::PlaybackStateChanged(state) => {
                trace!(?state, "Engine state changed");
            }
            EngineEvent::MediaItemTransitioned { uri } => {
                debug!(%uri, "Engine transitioned media item");
            }
            EngineEvent::Error { code, message } => {
                warn!(code, %message, "Engine reported error");
                self.emit(SessionEvent::Error { code, message });
            }
        }
    }

    /// Sample the engine's position while playing
    pub fn poll_position(&mut self) {
        self.refresh_duration();
        self.transport.set_position(self.engine.current_position_ms());

        if self.transport.duration_ms() > 0 {
            self.emit_position();
        }
    }

    fn on_track_ended(&mut self) -> Result<()> {
        match self.transport.on_track_ended(&self.queue, &mut self.rng) {
            EndOfTrack::RestartCurrent => {
                debug!("Repeating current track");
                let result = self.engine.seek_to(0).and_then(|()| self.engine.play());
                self.transport.set_position(0);
                self.emit_position();
                self.surface(result)
            }
            EndOfTrack::Advance(index) => self.move_to(index),
            EndOfTrack::Finished => {
                info!("Queue finished");
                self.finished = true;
                self.transport.set_position(self.transport.duration_ms());
                self.emit(SessionEvent::QueueFinished);
                Ok(())
            }
        }
    }

    // ===== Lifecycle =====

    /// Stop the engine for good and take down the notification
    pub fn release(&mut self) {
        if self.released {
            return;
        }

        info!("Releasing playback session");
        self.engine.pause().ok();
        self.engine.release();
        self.notifier.clear();
        self.surface_active = false;
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    // ===== State Queries =====

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn position_ms(&self) -> u64 {
        self.transport.position_ms()
    }

    pub fn duration_ms(&self) -> u64 {
        self.transport.duration_ms()
    }

    /// Play state as last reported by the engine
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.transport.shuffle_enabled()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.transport.repeat_mode()
    }

    pub fn can_go_next(&self) -> bool {
        self.transport.can_go_next(&self.queue)
    }

    pub fn can_go_previous(&self) -> bool {
        self.transport.can_go_previous(&self.queue)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            track: self.queue.current().cloned(),
            index: self.queue.current_index(),
            queue_len: self.queue.len(),
            is_playing: self.transport.is_playing(),
            position_ms: self.transport.position_ms(),
            duration_ms: self.transport.duration_ms(),
            shuffle_enabled: self.transport.shuffle_enabled(),
            repeat_mode: self.transport.repeat_mode(),
            can_go_previous: self.can_go_previous(),
            can_go_next: self.can_go_next(),
        }
    }

    // ===== Event Handling =====

    /// Take all events emitted since the last drain, in order
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn move_to(&mut self, index: usize) -> Result<()> {
        self.queue = self.queue.with_cursor(index)?;
        self.load_current()
    }

    fn load_current(&mut self) -> Result<()> {
        let Some(track) = self.queue.current().cloned() else {
            return Ok(());
        };
        let index = self.queue.current_index().unwrap_or_default();

        debug!(track_id = %track.id(), index, "Loading track");
        self.finished = false;
        self.surface_active = true;
        self.transport.reset_for_track(track.duration_ms());
        self.emit(SessionEvent::TrackChanged {
            track: track.clone(),
            index,
            queue_len: self.queue.len(),
        });
        self.emit_navigation();

        let result = self.start_engine(track.stream_uri());
        if result.is_ok() {
            // Catalog entries may not know their length; the engine might
            self.refresh_duration();
        }
        self.surface(result)
    }

    fn refresh_duration(&mut self) {
        let duration = self.engine.duration_ms();
        if duration > 0 {
            self.transport.set_duration(duration);
        }
    }

    fn start_engine(&mut self, stream_uri: &str) -> Result<()> {
        self.engine.load(stream_uri)?;
        self.engine.prepare()?;
        self.engine.play()
    }

    /// Turn a failed engine call into an `Error` event, passing the result on
    fn surface(&mut self, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            warn!(error = %err, "Engine call failed");
            let (code, message) = match err {
                PlaybackError::Engine { code, message } => (*code, message.clone()),
                other => (ERROR_CODE_UNSPECIFIED, other.to_string()),
            };
            self.emit(SessionEvent::Error { code, message });
        }
        result
    }

    fn emit(&mut self, event: SessionEvent) {
        let refresh = event.affects_notification();
        self.pending_events.push(event);
        if refresh {
            self.refresh_notification();
        }
    }

    fn emit_navigation(&mut self) {
        self.emit(SessionEvent::NavigationChanged {
            can_go_previous: self.can_go_previous(),
            can_go_next: self.can_go_next(),
        });
    }

    fn emit_position(&mut self) {
        self.emit(SessionEvent::PositionChanged {
            position_ms: self.transport.position_ms(),
            duration_ms: self.transport.duration_ms(),
        });
    }

    fn refresh_notification(&mut self) {
        if !self.surface_active || self.released {
            return;
        }
        let Some(track) = self.queue.current() else {
            return;
        };

        let state = NotificationState {
            track: track.clone(),
            is_playing: self.transport.is_playing(),
            can_go_previous: self.transport.can_go_previous(&self.queue),
            can_go_next: self.transport.can_go_next(&self.queue),
        };
        self.notifier.update(&state);
    }
}
