//! Player screen presenter

use crate::error::Result;
use crate::view::{PlayerView, Progress};
use cadence_core::Track;
use cadence_playback::{
    ConnectionState, ConnectorEvent, PlaybackError, Queue, SessionBinder, SessionConnector,
    SessionEvent, SessionSnapshot, TransportState,
};
use tracing::{debug, info, warn};

/// Drives the player view from a session connector
pub struct PlayerPresenter<B: SessionBinder, V: PlayerView> {
    connector: SessionConnector<B>,
    view: Option<V>,
    playlist: Vec<Track>,
    current_index: usize,
    duration_ms: u64,
}

impl<B: SessionBinder, V: PlayerView> PlayerPresenter<B, V> {
    pub fn new(connector: SessionConnector<B>, view: V) -> Self {
        Self {
            connector,
            view: Some(view),
            playlist: Vec::new(),
            current_index: 0,
            duration_ms: 0,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connector.state()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Show `tracks` and start playing at `start` once the session is bound
    pub fn initialize(&mut self, tracks: Vec<Track>, start: usize) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::Configuration("nothing to play".to_string()).into());
        }
        let queue = Queue::from_tracks(tracks.clone(), start)?;
        let transport = TransportState::default();

        if let Some(view) = self.view.as_mut() {
            if let Some(track) = queue.current() {
                view.show_song_info(track);
            }
            view.show_playlist(queue.tracks(), start);
            view.update_navigation(
                transport.can_go_previous(&queue),
                transport.can_go_next(&queue),
            );
        }

        info!(tracks = tracks.len(), start, "Initializing player");
        self.playlist = tracks.clone();
        self.current_index = start;
        self.connector.connect();
        self.connector.play_queue_with_retry(tracks, start)?;
        Ok(())
    }

    pub fn play_pause(&mut self) {
        self.connector.play_pause();
    }

    pub fn seek_to(&mut self, position_ms: i64) {
        debug!(position_ms, "Seek requested");
        self.connector.seek_to(position_ms);
    }

    pub fn skip_next(&mut self) {
        self.connector.next();
    }

    pub fn skip_previous(&mut self) {
        self.connector.previous();
    }

    pub fn toggle_shuffle(&mut self) {
        self.connector.toggle_shuffle();
    }

    pub fn toggle_repeat(&mut self) {
        self.connector.toggle_repeat();
    }

    pub fn stop(&mut self) {
        self.connector.stop();
    }

    /// Next event from the connector, to be passed back to [`Self::handle`]
    pub async fn next_event(&mut self) -> ConnectorEvent {
        self.connector.next_event().await
    }

    /// Reflect a connector event on the view
    pub fn handle(&mut self, event: ConnectorEvent) {
        match event {
            ConnectorEvent::Connected(snapshot) => self.show_snapshot(&snapshot),
            ConnectorEvent::Session(event) => self.handle_session(event),
            ConnectorEvent::ConnectionError(err) | ConnectorEvent::PlaybackError(err) => {
                warn!(error = %err, "Player error");
                if let Some(view) = self.view.as_mut() {
                    view.show_error(&err.to_string());
                }
            }
        }
    }

    /// Drop the view and disconnect, cancelling any pending retry
    pub fn detach_view(&mut self) -> Option<V> {
        self.connector.disconnect();
        self.view.take()
    }

    fn show_snapshot(&mut self, snapshot: &SessionSnapshot) {
        debug!(index = ?snapshot.index, "Connected to playback session");
        let Some(view) = self.view.as_mut() else {
            return;
        };
        // A fresh session has nothing to show yet
        if let Some(track) = &snapshot.track {
            view.show_song_info(track);
            view.update_play_pause(snapshot.is_playing);
            view.update_progress(&Progress::new(snapshot.position_ms, snapshot.duration_ms));
        }
        view.update_shuffle(snapshot.shuffle_enabled);
        view.update_repeat(snapshot.repeat_mode);
        view.update_navigation(snapshot.can_go_previous, snapshot.can_go_next);
    }

    fn handle_session(&mut self, event: SessionEvent) {
        match &event {
            SessionEvent::TrackChanged { index, track, .. } => {
                self.current_index = *index;
                self.duration_ms = track.duration_ms();
            }
            SessionEvent::PositionChanged { duration_ms, .. } => self.duration_ms = *duration_ms,
            _ => {}
        }

        let Some(view) = self.view.as_mut() else {
            return;
        };
        match event {
            SessionEvent::TrackChanged {
                track,
                index,
                queue_len,
            } => {
                view.show_song_info(&track);
                if queue_len == self.playlist.len() {
                    view.show_playlist(&self.playlist, index);
                }
            }
            SessionEvent::PlayingChanged { is_playing } => view.update_play_pause(is_playing),
            SessionEvent::PositionChanged {
                position_ms,
                duration_ms,
            } => view.update_progress(&Progress::new(position_ms, duration_ms)),
            SessionEvent::ShuffleChanged { enabled } => view.update_shuffle(enabled),
            SessionEvent::RepeatChanged { mode } => view.update_repeat(mode),
            SessionEvent::NavigationChanged {
                can_go_previous,
                can_go_next,
            } => view.update_navigation(can_go_previous, can_go_next),
            SessionEvent::QueueFinished => {
                view.update_play_pause(false);
                view.show_finished();
            }
            SessionEvent::Stopped => {
                view.update_play_pause(false);
                view.update_progress(&Progress::new(0, self.duration_ms));
            }
            SessionEvent::Error { code, message } => {
                warn!(code, %message, "Playback error");
                view.show_error(&format!("Playback error ({code}): {message}"));
            }
        }
    }
}

