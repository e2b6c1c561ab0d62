//! Integration tests for the library and player presenters
//!
//! Views record every call; the player runs against a real session host and
//! the simulated engine on paused tokio time.

use async_trait::async_trait;
use cadence_console::{ConsoleError, LibraryPresenter, LibraryView, PlayerPresenter, PlayerView, Progress};
use cadence_core::{CadenceError, Catalog, MemoryCatalog, NewTrack, Playlist, Track, TrackId};
use cadence_playback::{
    ConnectionState, ConnectorEvent, LogNotifier, PlaybackConfig, PlaybackError, RepeatMode,
    RetryPolicy, SessionBinder, SessionConnector, SessionEvent, SessionHandle, SessionHost,
    SessionLink, SimulatedEngine,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

// ===== Test Helpers =====

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn has(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }
}

struct RecordingView(Recorder);

impl LibraryView for RecordingView {
    fn show_loading(&mut self) {
        self.0.push("loading".into());
    }

    fn hide_loading(&mut self) {
        self.0.push("loaded".into());
    }

    fn show_songs(&mut self, playlist: &Playlist) {
        let titles: Vec<&str> = playlist.tracks.iter().map(Track::title).collect();
        self.0.push(format!("songs:{}", titles.join(",")));
    }

    fn show_empty_state(&mut self) {
        self.0.push("empty".into());
    }

    fn show_error(&mut self, message: &str) {
        self.0.push(format!("error:{message}"));
    }

    fn show_now_playing(&mut self, track: &Track) {
        self.0.push(format!("now_playing:{}", track.title()));
    }

    fn update_now_playing(&mut self, is_playing: bool, percent: u8) {
        self.0.push(format!("mini:{is_playing} {percent}%"));
    }
}

impl PlayerView for RecordingView {
    fn show_song_info(&mut self, track: &Track) {
        self.0.push(format!("song:{}", track.title()));
    }

    fn show_playlist(&mut self, tracks: &[Track], current: usize) {
        self.0.push(format!("playlist:{}@{current}", tracks.len()));
    }

    fn update_play_pause(&mut self, is_playing: bool) {
        self.0.push(format!("playing:{is_playing}"));
    }

    fn update_progress(&mut self, progress: &Progress) {
        self.0.push(format!(
            "progress:{}/{} {}%",
            progress.position_text, progress.duration_text, progress.percent
        ));
    }

    fn update_navigation(&mut self, can_go_previous: bool, can_go_next: bool) {
        self.0.push(format!("nav:{can_go_previous},{can_go_next}"));
    }

    fn update_shuffle(&mut self, enabled: bool) {
        self.0.push(format!("shuffle:{enabled}"));
    }

    fn update_repeat(&mut self, mode: RepeatMode) {
        self.0.push(format!("repeat:{mode}"));
    }

    fn show_finished(&mut self) {
        self.0.push("finished".into());
    }

    fn show_error(&mut self, message: &str) {
        self.0.push(format!("error:{message}"));
    }
}

/// Always fails, like a provider with no network
struct FailingCatalog;

#[async_trait]
impl Catalog for FailingCatalog {
    async fn fetch_all(&self) -> cadence_core::Result<Vec<Track>> {
        Err(CadenceError::catalog("network unreachable"))
    }

    async fn search(&self, _query: &str) -> cadence_core::Result<Vec<Track>> {
        Err(CadenceError::catalog("network unreachable"))
    }
}

/// Answers after a delay
struct SlowCatalog {
    inner: MemoryCatalog,
    delay: Duration,
}

#[async_trait]
impl Catalog for SlowCatalog {
    async fn fetch_all(&self) -> cadence_core::Result<Vec<Track>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_all().await
    }

    async fn search(&self, query: &str) -> cadence_core::Result<Vec<Track>> {
        tokio::time::sleep(self.delay).await;
        self.inner.search(query).await
    }
}

/// Never binds
struct NeverBinder;

impl SessionBinder for NeverBinder {
    async fn bind(&self) -> cadence_playback::Result<SessionLink> {
        std::future::pending().await
    }
}

fn track(id: &str, title: &str, artist: &str, duration_ms: u64) -> Track {
    Track::new(NewTrack {
        id: TrackId::new(id),
        title: title.to_string(),
        artist: artist.to_string(),
        album: "Album".to_string(),
        duration_ms,
        stream_uri: format!("https://example.com/{id}.mp3"),
        ..Default::default()
    })
    .unwrap()
}

fn songs() -> Vec<Track> {
    vec![
        track("1", "Blinding Lights", "The Weeknd", 200_000),
        track("2", "Watermelon Sugar", "Harry Styles", 174_000),
        track("3", "Levitating", "Dua Lipa", 203_000),
    ]
}

fn spawn_session() -> SessionHandle {
    let engine = songs()
        .iter()
        .fold(SimulatedEngine::new(), |engine, t| {
            engine.with_duration(t.stream_uri(), t.duration_ms())
        });
    SessionHost::spawn(engine, Box::new(LogNotifier::new()), PlaybackConfig::default())
}

fn library<C: Catalog + 'static>(catalog: C) -> (LibraryPresenter<C, RecordingView>, Recorder) {
    let recorder = Recorder::default();
    let mut presenter = LibraryPresenter::new(Arc::new(catalog));
    presenter.attach_view(RecordingView(recorder.clone()));
    (presenter, recorder)
}

fn player<B: SessionBinder>(binder: B) -> (PlayerPresenter<B, RecordingView>, Recorder) {
    let recorder = Recorder::default();
    let connector = SessionConnector::new(binder, RetryPolicy::default());
    let presenter = PlayerPresenter::new(connector, RecordingView(recorder.clone()));
    (presenter, recorder)
}

/// Feed every connector event within `window` back into the presenter
async fn pump_for<B: SessionBinder>(presenter: &mut PlayerPresenter<B, RecordingView>, window: Duration) -> usize {
    let deadline = Instant::now() + window;
    let mut handled = 0;
    loop {
        tokio::select! {
            event = presenter.next_event() => {
                presenter.handle(event);
                handled += 1;
            }
            _ = tokio::time::sleep_until(deadline) => break,
        }
    }
    handled
}

// ===== Library =====

#[tokio::test]
async fn load_songs_shows_list_between_loading_markers() {
    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));

    presenter.load_songs();
    assert!(presenter.is_loading());
    assert!(presenter.next_update().await);

    assert_eq!(
        recorder.calls(),
        vec![
            "loading",
            "songs:Blinding Lights,Watermelon Sugar,Levitating",
            "loaded"
        ]
    );
    assert_eq!(presenter.songs().len(), 3);
    assert!(!presenter.next_update().await);
}

#[tokio::test]
async fn search_without_matches_shows_empty_state() {
    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));

    presenter.search("no such song");
    presenter.next_update().await;

    assert_eq!(recorder.calls(), vec!["empty"]);
    assert!(presenter.songs().is_empty());
}

#[tokio::test]
async fn clear_search_restores_full_list() {
    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));

    presenter.search("harry");
    presenter.next_update().await;
    presenter.clear_search();
    presenter.next_update().await;

    assert_eq!(
        recorder.calls(),
        vec![
            "songs:Watermelon Sugar",
            "songs:Blinding Lights,Watermelon Sugar,Levitating",
        ]
    );
    assert_eq!(presenter.playlist().name, "All songs");
}

#[tokio::test]
async fn search_results_are_named_after_query() {
    let (mut presenter, _) = library(MemoryCatalog::new(songs()));

    presenter.search("dua");
    presenter.next_update().await;

    assert_eq!(presenter.playlist().name, "Results for \"dua\"");
    assert_eq!(presenter.playlist().formatted_total_duration(), "03:23");
}

#[tokio::test(start_paused = true)]
async fn search_replacing_load_still_hides_indicator() {
    let (mut presenter, recorder) = library(SlowCatalog {
        inner: MemoryCatalog::new(songs()),
        delay: Duration::from_millis(300),
    });

    presenter.load_songs();
    presenter.search("dua");
    while presenter.next_update().await {}

    assert_eq!(recorder.calls(), vec!["loading", "songs:Levitating", "loaded"]);
}

#[tokio::test(start_paused = true)]
async fn repeated_load_shows_indicator_once() {
    let (mut presenter, recorder) = library(SlowCatalog {
        inner: MemoryCatalog::new(songs()),
        delay: Duration::from_millis(300),
    });

    presenter.load_songs();
    presenter.load_songs();
    while presenter.next_update().await {}

    assert_eq!(
        recorder.calls(),
        vec![
            "loading",
            "songs:Blinding Lights,Watermelon Sugar,Levitating",
            "loaded"
        ]
    );
}

#[tokio::test]
async fn catalog_failure_is_shown_and_loading_hidden() {
    let (mut presenter, recorder) = library(FailingCatalog);

    presenter.load_songs();
    presenter.next_update().await;
    presenter.search("x");
    presenter.next_update().await;

    assert_eq!(
        recorder.calls(),
        vec![
            "loading",
            "error:Failed to load songs: Catalog error: network unreachable",
            "loaded",
            "error:Search failed: Catalog error: network unreachable",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn newer_search_replaces_older_one() {
    let (mut presenter, recorder) = library(SlowCatalog {
        inner: MemoryCatalog::new(songs()),
        delay: Duration::from_millis(300),
    });

    presenter.search("harry");
    presenter.search("dua");
    presenter.next_update().await;

    assert_eq!(recorder.calls(), vec!["songs:Levitating"]);
}

#[tokio::test(start_paused = true)]
async fn detach_cancels_in_flight_load() {
    let (mut presenter, recorder) = library(SlowCatalog {
        inner: MemoryCatalog::new(songs()),
        delay: Duration::from_secs(5),
    });

    presenter.load_songs();
    assert!(presenter.detach_view().is_some());
    assert!(!presenter.is_loading());
    assert!(!presenter.next_update().await);
    assert_eq!(recorder.calls(), vec!["loading", "loaded"]);
}

#[tokio::test(start_paused = true)]
async fn selected_song_starts_queue_through_connector() {
    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));
    presenter.load_songs();
    presenter.next_update().await;

    let mut connector = SessionConnector::new(spawn_session(), RetryPolicy::default());
    presenter.on_song_selected(1, &mut connector).unwrap();
    assert!(connector.has_pending_play());

    connector.connect();
    assert!(matches!(connector.next_event().await, ConnectorEvent::Connected(_)));
    let changed = loop {
        let event = connector.next_event().await;
        presenter.on_connector_event(&event);
        if let ConnectorEvent::Session(SessionEvent::TrackChanged { index, .. }) = event {
            break index;
        }
    };
    assert_eq!(changed, 1);
    assert!(recorder.has("now_playing:Watermelon Sugar"));
}

#[tokio::test(start_paused = true)]
async fn mini_player_follows_session() {
    let handle = spawn_session();
    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));
    presenter.load_songs();
    presenter.next_update().await;

    let mut connector = SessionConnector::new(handle.clone(), RetryPolicy::default());
    connector.connect();
    presenter.on_song_selected(0, &mut connector).unwrap();

    let deadline = Instant::now() + Duration::from_millis(2_500);
    loop {
        tokio::select! {
            event = connector.next_event() => presenter.on_connector_event(&event),
            _ = tokio::time::sleep_until(deadline) => break,
        }
    }
    assert!(recorder.has("now_playing:Blinding Lights"));
    assert!(recorder.has("mini:true 0%"));

    connector.stop();
    let deadline = Instant::now() + Duration::from_millis(100);
    loop {
        tokio::select! {
            event = connector.next_event() => presenter.on_connector_event(&event),
            _ = tokio::time::sleep_until(deadline) => break,
        }
    }
    assert_eq!(recorder.calls().last().map(String::as_str), Some("mini:false 0%"));
}

#[tokio::test(start_paused = true)]
async fn mini_player_picks_up_playing_session_on_connect() {
    let handle = spawn_session();
    let mut first = SessionConnector::new(handle.clone(), RetryPolicy::default());
    first.play_queue(songs(), 2).unwrap();
    first.connect();
    while !matches!(
        first.next_event().await,
        ConnectorEvent::Session(SessionEvent::PlayingChanged { is_playing: true })
    ) {}

    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));
    let mut second = SessionConnector::new(handle, RetryPolicy::default());
    second.connect();
    let event = second.next_event().await;
    presenter.on_connector_event(&event);

    assert_eq!(recorder.calls(), vec!["now_playing:Levitating", "mini:true 0%"]);
}

#[tokio::test]
async fn selecting_outside_list_is_rejected() {
    let (mut presenter, recorder) = library(MemoryCatalog::new(songs()));
    presenter.load_songs();
    presenter.next_update().await;

    let mut connector = SessionConnector::new(NeverBinder, RetryPolicy::default());
    let err = presenter.on_song_selected(3, &mut connector).unwrap_err();

    assert!(matches!(
        err,
        ConsoleError::Playback(PlaybackError::InvalidIndex { index: 3, len: 3 })
    ));
    assert!(!recorder.calls().iter().any(|c| c.starts_with("now_playing")));
}

// ===== Player =====

#[tokio::test(start_paused = true)]
async fn initialize_shows_queue_then_plays_once_bound() {
    let (mut presenter, recorder) = player(spawn_session());

    presenter.initialize(songs(), 0).unwrap();
    assert_eq!(
        recorder.calls(),
        vec!["song:Blinding Lights", "playlist:3@0", "nav:false,true"]
    );

    pump_for(&mut presenter, Duration::from_secs(3)).await;

    assert_eq!(presenter.connection_state(), ConnectionState::Connected);
    assert!(recorder.has("playing:true"));
    assert!(recorder.has("progress:0:01/3:20 0%"));

    presenter.skip_next();
    pump_for(&mut presenter, Duration::from_millis(100)).await;
    assert_eq!(presenter.current_index(), 1);
    assert!(recorder.has("song:Watermelon Sugar"));
    assert!(recorder.has("playlist:3@1"));
    assert!(recorder.has("nav:true,true"));
}

#[tokio::test(start_paused = true)]
async fn toggles_are_reflected_from_session() {
    let (mut presenter, recorder) = player(spawn_session());
    presenter.initialize(songs(), 2).unwrap();
    pump_for(&mut presenter, Duration::from_secs(1)).await;

    presenter.toggle_repeat();
    presenter.toggle_shuffle();
    pump_for(&mut presenter, Duration::from_millis(100)).await;

    assert!(recorder.has("repeat:all"));
    assert!(recorder.has("shuffle:true"));
    assert!(recorder.has("nav:true,true"));
}

#[tokio::test]
async fn session_events_map_to_view_updates() {
    let (mut presenter, recorder) = player(NeverBinder);

    presenter.handle(ConnectorEvent::Session(SessionEvent::PositionChanged {
        position_ms: 65_000,
        duration_ms: 200_000,
    }));
    presenter.handle(ConnectorEvent::Session(SessionEvent::Error {
        code: 2005,
        message: "source not found".to_string(),
    }));
    presenter.handle(ConnectorEvent::Session(SessionEvent::Stopped));
    presenter.handle(ConnectorEvent::Session(SessionEvent::QueueFinished));
    presenter.handle(ConnectorEvent::ConnectionError(PlaybackError::connection(
        "service refused binding",
    )));

    assert_eq!(
        recorder.calls(),
        vec![
            "progress:1:05/3:20 32%",
            "error:Playback error (2005): source not found",
            "playing:false",
            "progress:0:00/3:20 0%",
            "playing:false",
            "finished",
            "error:Connection error: service refused binding",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn retry_exhaustion_is_shown_to_user() {
    let (mut presenter, recorder) = player(NeverBinder);
    presenter.initialize(songs(), 0).unwrap();

    pump_for(&mut presenter, Duration::from_secs(10)).await;

    assert!(recorder.calls().iter().any(|c| c.starts_with("error:Connection error: Failed to connect")));
}

#[tokio::test(start_paused = true)]
async fn detach_disconnects_and_cancels_retry() {
    let (mut presenter, recorder) = player(NeverBinder);
    presenter.initialize(songs(), 0).unwrap();

    assert!(presenter.detach_view().is_some());
    assert_eq!(presenter.connection_state(), ConnectionState::Disconnected);

    let handled = pump_for(&mut presenter, Duration::from_secs(10)).await;
    assert_eq!(handled, 0);
    assert_eq!(recorder.calls().len(), 3);
}

#[tokio::test]
async fn initialize_rejects_bad_start_index() {
    let (mut presenter, recorder) = player(NeverBinder);

    assert!(presenter.initialize(songs(), 5).is_err());
    assert!(presenter.initialize(Vec::new(), 0).is_err());
    assert!(recorder.calls().is_empty());
    assert_eq!(presenter.connection_state(), ConnectionState::Disconnected);
}
