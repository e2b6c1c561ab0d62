//! Background session host
//!
//! Runs a [`PlaybackSession`] on its own tokio task. Commands arrive over an
//! `mpsc` channel and are applied one at a time; engine callbacks arrive as
//! messages on a second channel; events fan out over `broadcast` to every
//! bound connector. The position poll only exists while the engine is playing
//! and someone is listening.

use crate::{
    engine::{Engine, EngineEvent, EngineListener},
    error::{PlaybackError, Result},
    events::{SessionCommand, SessionEvent},
    notification::NotificationSurface,
    session::PlaybackSession,
    types::{PlaybackConfig, SessionSnapshot},
};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Messages understood by the session task
#[derive(Debug)]
enum SessionMessage {
    Command(SessionCommand),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Command sender for a running session
#[derive(Debug, Clone)]
pub struct SessionSender {
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionSender {
    /// Queue a command behind any already sent
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(SessionMessage::Command(command))
            .map_err(|_| PlaybackError::SessionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the session task has exited
    pub async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// A successful binding: where to send commands and hear events
#[derive(Debug)]
pub struct SessionLink {
    pub commands: SessionSender,
    pub events: broadcast::Receiver<SessionEvent>,
    /// Session state at bind time, for late subscribers
    pub snapshot: SessionSnapshot,
}

/// Something a connector can bind to
///
/// Binding may complete on any worker thread; connectors marshal the result
/// back onto their own task.
pub trait SessionBinder: Send + Sync + 'static {
    fn bind(&self) -> impl Future<Output = Result<SessionLink>> + Send;
}

/// Cloneable handle to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: SessionSender,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands.send(command)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current session state
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .tx
            .send(SessionMessage::Snapshot(reply))
            .map_err(|_| PlaybackError::SessionClosed)?;
        response.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Ask the session to release its engine and exit
    pub fn shutdown(&self) {
        self.commands.tx.send(SessionMessage::Shutdown).ok();
    }

    /// Resolves once the session task has exited
    pub async fn closed(&self) {
        self.commands.closed().await;
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

impl SessionBinder for SessionHandle {
    async fn bind(&self) -> Result<SessionLink> {
        // Subscribe first so nothing emitted after the snapshot is missed
        let events = self.subscribe();
        let snapshot = self
            .snapshot()
            .await
            .map_err(|_| PlaybackError::connection("playback session is not running"))?;

        Ok(SessionLink {
            commands: self.commands.clone(),
            events,
            snapshot,
        })
    }
}

/// Spawns playback sessions
pub struct SessionHost;

impl SessionHost {
    /// Start a session on the current tokio runtime
    ///
    /// The session lives until `SessionHandle::shutdown` is called or every
    /// handle and link is dropped.
    pub fn spawn<E>(
        mut engine: E,
        notifier: Box<dyn NotificationSurface>,
        config: PlaybackConfig,
    ) -> SessionHandle
    where
        E: Engine + 'static,
    {
        let (listener, engine_events) = EngineListener::channel();
        engine.set_listener(listener);

        let session = PlaybackSession::new(engine, notifier, &config);
        let (tx, inbox) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let poll_every = config.position_poll_interval().max(MIN_POLL_INTERVAL);

        tokio::spawn(run(session, inbox, engine_events, events.clone(), poll_every));
        info!(poll_ms = poll_every.as_millis() as u64, "Playback session started");

        SessionHandle {
            commands: SessionSender { tx },
            events,
        }
    }
}

async fn run<E: Engine>(
    mut session: PlaybackSession<E>,
    mut inbox: mpsc::UnboundedReceiver<SessionMessage>,
    mut engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    events: broadcast::Sender<SessionEvent>,
    poll_every: Duration,
) {
    let mut poll: Option<Interval> = None;

    loop {
        tokio::select! {
            message = inbox.recv() => match message {
                Some(SessionMessage::Command(command)) => {
                    if let Err(err) = session.apply(command) {
                        debug!(error = %err, "Command failed");
                    }
                }
                Some(SessionMessage::Snapshot(reply)) => {
                    reply.send(session.snapshot()).ok();
                }
                Some(SessionMessage::Shutdown) | None => break,
            },
            Some(event) = engine_events.recv() => session.handle_engine_event(event),
            () = next_tick(&mut poll) => session.poll_position(),
        }

        publish(&mut session, &events);
        let wanted = session.is_playing() && events.receiver_count() > 0;
        update_poll(&mut poll, wanted, poll_every);
    }

    session.release();
    publish(&mut session, &events);
    info!("Playback session ended");
}

fn publish<E: Engine>(session: &mut PlaybackSession<E>, events: &broadcast::Sender<SessionEvent>) {
    for event in session.drain_events() {
        trace!(?event, "Publishing session event");
        // No subscribers is fine
        events.send(event).ok();
    }
}

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn update_poll(poll: &mut Option<Interval>, wanted: bool, period: Duration) {
    match (poll.is_some(), wanted) {
        (false, true) => {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *poll = Some(interval);
            trace!("Position poll started");
        }
        (true, false) => {
            *poll = None;
            trace!("Position poll stopped");
        }
        _ => {}
    }
}
