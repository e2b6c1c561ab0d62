//! Library screen presenter

use crate::error::Result;
use crate::view::LibraryView;
use cadence_core::{progress_percent, Catalog, CadenceError, Playlist, Track};
use cadence_playback::{ConnectorEvent, SessionBinder, SessionConnector, SessionEvent};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const ALL_SONGS: &str = "All songs";

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadKind {
    All,
    Search(String),
}

impl LoadKind {
    fn title(&self) -> String {
        match self {
            LoadKind::All => ALL_SONGS.to_string(),
            LoadKind::Search(query) => format!("Results for \"{query}\""),
        }
    }
}

/// A catalog request running on its own task
struct Load {
    kind: LoadKind,
    handle: JoinHandle<cadence_core::Result<Vec<Track>>>,
}

/// What the mini player last showed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MiniPlayer {
    is_playing: bool,
    percent: u8,
}

/// Loads and searches the catalog, starts playback of a picked song and
/// keeps a mini player in step with the session
pub struct LibraryPresenter<C: Catalog, V: LibraryView> {
    catalog: Arc<C>,
    view: Option<V>,
    playlist: Playlist,
    load: Option<Load>,
    // Indicator on screen until a result lands or the view goes away
    loading_shown: bool,
    mini_player: Option<MiniPlayer>,
}

impl<C, V> LibraryPresenter<C, V>
where
    C: Catalog + 'static,
    V: LibraryView,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            view: None,
            playlist: Playlist::new(ALL_SONGS, Vec::new()),
            load: None,
            loading_shown: false,
            mini_player: None,
        }
    }

    pub fn attach_view(&mut self, view: V) {
        self.view = Some(view);
    }

    /// Drop the view and cancel any in-flight load or search
    pub fn detach_view(&mut self) -> Option<V> {
        self.cancel_load();
        self.hide_loading();
        self.view.take()
    }

    /// The list currently on screen
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn songs(&self) -> &[Track] {
        &self.playlist.tracks
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    /// Fetch the full song list
    pub fn load_songs(&mut self) {
        if !self.loading_shown {
            if let Some(view) = self.view.as_mut() {
                view.show_loading();
                self.loading_shown = true;
            }
        }
        self.start(LoadKind::All);
    }

    /// Replace the list with the tracks matching `query`
    pub fn search(&mut self, query: &str) {
        self.start(LoadKind::Search(query.to_string()));
    }

    /// Back to the full list
    pub fn clear_search(&mut self) {
        self.start(LoadKind::All);
    }

    /// Wait for the in-flight load or search and show its result
    ///
    /// Returns `false` straight away when nothing is in flight.
    pub async fn next_update(&mut self) -> bool {
        let Some(load) = self.load.as_mut() else {
            return false;
        };
        let joined = (&mut load.handle).await;
        let kind = load.kind.clone();
        self.load = None;

        let result = joined.unwrap_or_else(|err| {
            warn!(error = %err, "Catalog task did not complete");
            Err(CadenceError::catalog(err.to_string()))
        });
        self.show(&kind, result);
        true
    }

    /// Play the on-screen list starting at `index`
    ///
    /// The mini player follows once the session reports the track.
    pub fn on_song_selected<B: SessionBinder>(
        &mut self,
        index: usize,
        connector: &mut SessionConnector<B>,
    ) -> Result<()> {
        connector.play_queue(self.playlist.tracks.clone(), index)?;
        debug!(index, playlist = %self.playlist.name, "Song selected");
        Ok(())
    }

    /// Keep the mini player in step with the session
    pub fn on_connector_event(&mut self, event: &ConnectorEvent) {
        let Some(view) = self.view.as_mut() else {
            return;
        };

        match event {
            ConnectorEvent::Connected(snapshot) => {
                // Something may already be playing
                if let Some(track) = &snapshot.track {
                    let state = MiniPlayer {
                        is_playing: snapshot.is_playing,
                        percent: progress_percent(snapshot.position_ms, snapshot.duration_ms),
                    };
                    view.show_now_playing(track);
                    view.update_now_playing(state.is_playing, state.percent);
                    self.mini_player = Some(state);
                }
            }
            ConnectorEvent::Session(SessionEvent::TrackChanged { track, .. }) => {
                let state = MiniPlayer {
                    is_playing: self.mini_player.is_some_and(|m| m.is_playing),
                    percent: 0,
                };
                view.show_now_playing(track);
                self.mini_player = Some(state);
            }
            ConnectorEvent::Session(SessionEvent::PlayingChanged { is_playing }) => {
                update_mini_player(view, &mut self.mini_player, |m| m.is_playing = *is_playing);
            }
            ConnectorEvent::Session(SessionEvent::PositionChanged {
                position_ms,
                duration_ms,
            }) => {
                let percent = progress_percent(*position_ms, *duration_ms);
                update_mini_player(view, &mut self.mini_player, |m| m.percent = percent);
            }
            ConnectorEvent::Session(SessionEvent::Stopped) => {
                update_mini_player(view, &mut self.mini_player, |m| {
                    m.is_playing = false;
                    m.percent = 0;
                });
            }
            ConnectorEvent::Session(SessionEvent::QueueFinished) => {
                update_mini_player(view, &mut self.mini_player, |m| m.is_playing = false);
            }
            _ => {}
        }
    }

    fn start(&mut self, kind: LoadKind) {
        // Only the latest request is shown
        self.cancel_load();

        let catalog = Arc::clone(&self.catalog);
        let request = kind.clone();
        let handle = tokio::spawn(async move {
            match request {
                LoadKind::All => catalog.fetch_all().await,
                LoadKind::Search(query) => catalog.search(&query).await,
            }
        });
        debug!(?kind, "Catalog request started");
        self.load = Some(Load { kind, handle });
    }

    fn cancel_load(&mut self) {
        if let Some(load) = self.load.take() {
            debug!(kind = ?load.kind, "Cancelling catalog request");
            load.handle.abort();
        }
    }

    fn hide_loading(&mut self) {
        if !self.loading_shown {
            return;
        }
        self.loading_shown = false;
        if let Some(view) = self.view.as_mut() {
            view.hide_loading();
        }
    }

    fn show(&mut self, kind: &LoadKind, result: cadence_core::Result<Vec<Track>>) {
        match result {
            Ok(songs) => {
                self.playlist = Playlist::new(kind.title(), songs);
                debug!(
                    playlist_id = %self.playlist.id,
                    tracks = self.playlist.len(),
                    "Song list ready"
                );
                if let Some(view) = self.view.as_mut() {
                    if self.playlist.is_empty() {
                        view.show_empty_state();
                    } else {
                        view.show_songs(&self.playlist);
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, ?kind, "Catalog request failed");
                if let Some(view) = self.view.as_mut() {
                    let message = match kind {
                        LoadKind::All => format!("Failed to load songs: {err}"),
                        LoadKind::Search(_) => format!("Search failed: {err}"),
                    };
                    view.show_error(&message);
                }
            }
        }

        self.hide_loading();
    }
}

fn update_mini_player<V: LibraryView>(
    view: &mut V,
    mini_player: &mut Option<MiniPlayer>,
    change: impl FnOnce(&mut MiniPlayer),
) {
    // Nothing to update before a track is shown
    let Some(state) = mini_player.as_mut() else {
        return;
    };
    let before = *state;
    change(state);
    if *state != before {
        view.update_now_playing(state.is_playing, state.percent);
    }
}

impl<C: Catalog, V: LibraryView> Drop for LibraryPresenter<C, V> {
    fn drop(&mut self) {
        if let Some(load) = self.load.take() {
            load.handle.abort();
        }
    }
}
