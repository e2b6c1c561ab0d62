//! Session connector
//!
//! UI-side adapter over an asynchronous binding to a playback session. The
//! command API is synchronous; everything that completes later (the bind, retry
//! timers, relayed session events) lands in one inbox and is applied by
//! [`SessionConnector::next_event`] on the caller's task, so connector state is
//! never touched from another thread.

use crate::{
    error::{PlaybackError, Result},
    events::{SessionCommand, SessionEvent},
    host::{SessionBinder, SessionLink, SessionSender},
    queue::Queue,
    types::{RetryPolicy, SessionSnapshot},
};
use cadence_core::Track;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Binding lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What the connector reports to its presenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorEvent {
    /// Bound; carries the session state at bind time
    Connected(SessionSnapshot),

    /// Relayed from the session
    Session(SessionEvent),

    /// Could not bind, or the session went away
    ConnectionError(PlaybackError),

    /// A command could not be delivered
    PlaybackError(PlaybackError),
}

/// Completions posted to the connector inbox
enum Inbound {
    Bound {
        generation: u64,
        result: Result<SessionLink>,
    },
    Relayed {
        generation: u64,
        event: SessionEvent,
    },
    Lagged {
        generation: u64,
        skipped: u64,
    },
    SessionLost {
        generation: u64,
    },
    RetryDue {
        generation: u64,
        token: u64,
        attempt: u32,
    },
}

/// A play-with-retry waiting for the connection
struct RetryingPlay {
    token: u64,
    queue: Queue,
}

/// Connector between one UI-side owner and a playback session
pub struct SessionConnector<B: SessionBinder> {
    binder: Arc<B>,
    retry: RetryPolicy,
    state: ConnectionState,
    commands: Option<SessionSender>,

    // Single buffered play command; newer ones overwrite it
    pending: Option<Queue>,
    retrying: Option<RetryingPlay>,
    next_retry_token: u64,

    // Bumped on disconnect so late completions are recognised and dropped
    generation: u64,

    inbox_tx: mpsc::UnboundedSender<Inbound>,
    inbox_rx: mpsc::UnboundedReceiver<Inbound>,
    outbox: VecDeque<ConnectorEvent>,

    bind_task: Option<JoinHandle<()>>,
    relay_task: Option<JoinHandle<()>>,
    retry_task: Option<JoinHandle<()>>,
}

impl<B: SessionBinder> SessionConnector<B> {
    pub fn new(binder: B, retry: RetryPolicy) -> Self {
        Self::with_shared(Arc::new(binder), retry)
    }

    /// Connector over a binder shared with others
    pub fn with_shared(binder: Arc<B>, retry: RetryPolicy) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            binder,
            retry,
            state: ConnectionState::Disconnected,
            commands: None,
            pending: None,
            retrying: None,
            next_retry_token: 0,
            generation: 0,
            inbox_tx,
            inbox_rx,
            outbox: VecDeque::new(),
            bind_task: None,
            relay_task: None,
            retry_task: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Whether a play command is buffered until the bind completes
    pub fn has_pending_play(&self) -> bool {
        self.pending.is_some()
    }

    // ===== Connection =====

    /// Start binding; no-op unless disconnected
    ///
    /// Must be called within a tokio runtime.
    pub fn connect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            debug!(state = ?self.state, "Connect requested while not disconnected");
            return;
        }

        debug!(generation = self.generation, "Binding to playback session");
        self.state = ConnectionState::Connecting;

        let generation = self.generation;
        let binder = Arc::clone(&self.binder);
        let inbox = self.inbox_tx.clone();
        self.bind_task = Some(tokio::spawn(async move {
            let result = binder.bind().await;
            inbox.send(Inbound::Bound { generation, result }).ok();
        }));
    }

    /// Drop the binding and everything in flight; safe to call repeatedly
    pub fn disconnect(&mut self) {
        for task in [
            self.bind_task.take(),
            self.relay_task.take(),
            self.retry_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }

        if self.state != ConnectionState::Disconnected {
            info!("Disconnected from playback session");
        }

        self.commands = None;
        self.pending = None;
        self.retrying = None;
        self.outbox.clear();
        self.state = ConnectionState::Disconnected;
        self.generation += 1;
    }

    // ===== Commands =====

    /// Play `tracks` starting at `start_index`
    ///
    /// Validation errors are returned immediately. Before the bind completes
    /// the command is buffered, replacing any earlier one.
    pub fn play_queue(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        let queue = playable_queue(tracks, start_index)?;
        self.cancel_retry();

        if self.is_connected() {
            self.forward(SessionCommand::PlayQueue(queue));
        } else {
            if self.pending.is_some() {
                debug!("Replacing buffered play command");
            }
            debug!(tracks = queue.len(), start_index, "Buffering play until connected");
            self.pending = Some(queue);
        }
        Ok(())
    }

    /// Play a single track
    pub fn play_song(&mut self, track: Track) -> Result<()> {
        self.play_queue(vec![track], 0)
    }

    /// Play once connected, polling on the retry schedule
    ///
    /// Gives up with a `ConnectionError` event after the last retry.
    pub fn play_queue_with_retry(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        let queue = playable_queue(tracks, start_index)?;
        self.cancel_retry();
        self.pending = None;

        let token = self.next_retry_token;
        self.next_retry_token += 1;
        self.retrying = Some(RetryingPlay { token, queue });
        self.schedule_retry(token, 0);
        Ok(())
    }

    pub fn play_pause(&mut self) {
        self.send_if_connected(SessionCommand::PlayPause);
    }

    pub fn play(&mut self) {
        self.send_if_connected(SessionCommand::Play);
    }

    pub fn pause(&mut self) {
        self.send_if_connected(SessionCommand::Pause);
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.send_if_connected(SessionCommand::Next);
    }

    pub fn previous(&mut self) {
        self.send_if_connected(SessionCommand::Previous);
    }

    pub fn seek_to(&mut self, position_ms: i64) {
        self.send_if_connected(SessionCommand::SeekTo(position_ms));
    }

    pub fn toggle_shuffle(&mut self) {
        self.send_if_connected(SessionCommand::ToggleShuffle);
    }

    pub fn toggle_repeat(&mut self) {
        self.send_if_connected(SessionCommand::ToggleRepeat);
    }

    pub fn stop(&mut self) {
        self.send_if_connected(SessionCommand::Stop);
    }

    // ===== Event Pump =====

    /// Wait for the next event, applying completions on the way
    ///
    /// Pends forever while there is nothing in flight; use it inside
    /// `tokio::select!` alongside the owner's other inputs.
    pub async fn next_event(&mut self) -> ConnectorEvent {
        loop {
            if let Some(event) = self.outbox.pop_front() {
                return event;
            }
            let Some(inbound) = self.inbox_rx.recv().await else {
                // The connector holds a sender, so the inbox never closes
                return std::future::pending().await;
            };
            if let Some(event) = self.process(inbound) {
                return event;
            }
        }
    }

    /// Non-blocking variant of [`Self::next_event`]
    pub fn try_next_event(&mut self) -> Option<ConnectorEvent> {
        loop {
            if let Some(event) = self.outbox.pop_front() {
                return Some(event);
            }
            let inbound = self.inbox_rx.try_recv().ok()?;
            if let Some(event) = self.process(inbound) {
                return Some(event);
            }
        }
    }

    fn process(&mut self, inbound: Inbound) -> Option<ConnectorEvent> {
        match inbound {
            Inbound::Bound { generation, result } => {
                if generation != self.generation || self.state != ConnectionState::Connecting {
                    trace!(generation, "Ignoring stale bind result");
                    return None;
                }
                self.bind_task = None;

                match result {
                    Ok(link) => {
                        info!("Connected to playback session");
                        self.state = ConnectionState::Connected;
                        self.start_relay(link.events, link.commands.clone());
                        self.commands = Some(link.commands);

                        if let Some(queue) = self.pending.take() {
                            debug!("Applying buffered play command");
                            self.forward(SessionCommand::PlayQueue(queue));
                        }
                        Some(ConnectorEvent::Connected(link.snapshot))
                    }
                    Err(err) => {
                        warn!(error = %err, "Failed to bind playback session");
                        self.state = ConnectionState::Disconnected;
                        self.pending = None;
                        Some(ConnectorEvent::ConnectionError(err))
                    }
                }
            }
            Inbound::Relayed { generation, event } => {
                (generation == self.generation && self.is_connected())
                    .then_some(ConnectorEvent::Session(event))
            }
            Inbound::Lagged { generation, skipped } => {
                if generation == self.generation {
                    warn!(skipped, "Session events dropped, connector fell behind");
                }
                None
            }
            Inbound::SessionLost { generation } => {
                if generation != self.generation || !self.is_connected() {
                    return None;
                }
                warn!("Playback session closed");
                self.commands = None;
                self.relay_task = None;
                self.state = ConnectionState::Disconnected;
                Some(ConnectorEvent::ConnectionError(PlaybackError::connection(
                    "playback session closed",
                )))
            }
            Inbound::RetryDue {
                generation,
                token,
                attempt,
            } => {
                if generation != self.generation {
                    return None;
                }
                match &self.retrying {
                    Some(retrying) if retrying.token == token => {}
                    _ => return None,
                }
                self.retry_task = None;

                if self.is_connected() {
                    if let Some(retrying) = self.retrying.take() {
                        debug!(attempt, "Connected, playing queue");
                        self.forward(SessionCommand::PlayQueue(retrying.queue));
                    }
                    return None;
                }

                if attempt < self.retry.max_retries {
                    debug!(
                        attempt,
                        delay_ms = self.retry.delay_for(attempt + 1).as_millis() as u64,
                        "Not connected, retrying"
                    );
                    self.schedule_retry(token, attempt + 1);
                    return None;
                }

                self.retrying = None;
                warn!(retries = self.retry.max_retries, "Giving up on play request");
                Some(ConnectorEvent::ConnectionError(PlaybackError::connection(
                    format!(
                        "Failed to connect to playback session after {} retries",
                        self.retry.max_retries
                    ),
                )))
            }
        }
    }

    // ===== Internals =====

    fn send_if_connected(&mut self, command: SessionCommand) {
        if self.is_connected() {
            self.forward(command);
        } else {
            debug!(?command, "Not connected, dropping command");
        }
    }

    fn forward(&mut self, command: SessionCommand) {
        let Some(commands) = &self.commands else {
            return;
        };
        if let Err(err) = commands.send(command) {
            warn!(error = %err, "Failed to deliver command");
            self.outbox.push_back(ConnectorEvent::PlaybackError(err));
        }
    }

    fn start_relay(&mut self, mut events: broadcast::Receiver<SessionEvent>, session: SessionSender) {
        let generation = self.generation;
        let inbox = self.inbox_tx.clone();

        self.relay_task = Some(tokio::spawn(async move {
            loop {
                let inbound = tokio::select! {
                    biased;
                    received = events.recv() => match received {
                        Ok(event) => Inbound::Relayed { generation, event },
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            Inbound::Lagged { generation, skipped }
                        }
                        Err(broadcast::error::RecvError::Closed) => Inbound::SessionLost { generation },
                    },
                    () = session.closed() => Inbound::SessionLost { generation },
                };

                let lost = matches!(inbound, Inbound::SessionLost { .. });
                if inbox.send(inbound).is_err() || lost {
                    break;
                }
            }
        }));
    }

    fn schedule_retry(&mut self, token: u64, attempt: u32) {
        let generation = self.generation;
        let delay = self.retry.delay_for(attempt);
        let inbox = self.inbox_tx.clone();

        self.retry_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inbox
                .send(Inbound::RetryDue {
                    generation,
                    token,
                    attempt,
                })
                .ok();
        }));
    }

    fn cancel_retry(&mut self) {
        if let Some(task) = self.retry_task.take() {
            task.abort();
        }
        self.retrying = None;
    }
}

impl<B: SessionBinder> Drop for SessionConnector<B> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn playable_queue(tracks: Vec<Track>, start_index: usize) -> Result<Queue> {
    let queue = Queue::from_tracks(tracks, start_index)?;
    if queue.is_empty() {
        return Err(PlaybackError::Configuration(
            "cannot play an empty queue".to_string(),
        ));
    }
    Ok(queue)
}
