//! View seams for the presenters
//!
//! Presenters only talk to these traits. The console front end renders them as
//! plain lines on a writer; tests record the calls.

use cadence_core::{format_clock, progress_percent, Playlist, Track};
use cadence_playback::RepeatMode;
use std::io::Write;

/// Library screen: the song list and search results
pub trait LibraryView {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn show_songs(&mut self, playlist: &Playlist);
    fn show_empty_state(&mut self);
    fn show_error(&mut self, message: &str);
    /// Mini player: the session moved to `track`
    fn show_now_playing(&mut self, track: &Track);
    /// Mini player: play state or progress changed
    fn update_now_playing(&mut self, is_playing: bool, percent: u8);
}

/// Player screen: transport controls and the seek bar
pub trait PlayerView {
    fn show_song_info(&mut self, track: &Track);
    fn show_playlist(&mut self, tracks: &[Track], current: usize);
    fn update_play_pause(&mut self, is_playing: bool);
    fn update_progress(&mut self, progress: &Progress);
    fn update_navigation(&mut self, can_go_previous: bool, can_go_next: bool);
    fn update_shuffle(&mut self, enabled: bool);
    fn update_repeat(&mut self, mode: RepeatMode);
    fn show_finished(&mut self);
    fn show_error(&mut self, message: &str);
}

/// Seek bar state, pre-formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub position_text: String,
    pub duration_text: String,
    /// 0..=100
    pub percent: u8,
}

impl Progress {
    pub fn new(position_ms: u64, duration_ms: u64) -> Self {
        Self {
            position_ms,
            duration_ms,
            position_text: format_clock(position_ms),
            duration_text: format_clock(duration_ms),
            percent: progress_percent(position_ms, duration_ms),
        }
    }
}

/// Line-oriented renderer for both screens
pub struct ConsoleView<W: Write> {
    out: W,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Terminal output is best effort
    fn line(&mut self, text: &str) {
        writeln!(self.out, "{text}").ok();
    }
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

fn song_line(position: usize, track: &Track) -> String {
    format!(
        "{:>3}. {} - {} [{}]",
        position + 1,
        track.title(),
        track.artist_album_text(),
        track.formatted_duration()
    )
}

impl<W: Write> LibraryView for ConsoleView<W> {
    fn show_loading(&mut self) {
        self.line("Loading songs...");
    }

    fn hide_loading(&mut self) {}

    fn show_songs(&mut self, playlist: &Playlist) {
        self.line(&playlist.name);
        for (position, track) in playlist.tracks.iter().enumerate() {
            let line = song_line(position, track);
            self.line(&line);
        }
        self.line(&format!(
            "{} songs, {}",
            playlist.len(),
            playlist.formatted_total_duration()
        ));
    }

    fn show_empty_state(&mut self) {
        self.line("No songs found");
    }

    fn show_error(&mut self, message: &str) {
        self.line(&format!("error: {message}"));
    }

    fn show_now_playing(&mut self, track: &Track) {
        self.line(&format!("Now playing: {} - {}", track.title(), track.artist()));
    }

    fn update_now_playing(&mut self, is_playing: bool, percent: u8) {
        let state = if is_playing { "playing" } else { "paused" };
        self.line(&format!("  {state} {percent}%"));
    }
}

impl<W: Write> PlayerView for ConsoleView<W> {
    fn show_song_info(&mut self, track: &Track) {
        self.line(&format!(
            "Now playing: {} - {}",
            track.title(),
            track.artist_album_text()
        ));
    }

    fn show_playlist(&mut self, tracks: &[Track], current: usize) {
        for (position, track) in tracks.iter().enumerate() {
            let marker = if position == current { '>' } else { ' ' };
            let line = format!("{marker}{}", song_line(position, track));
            self.line(&line);
        }
    }

    fn update_play_pause(&mut self, is_playing: bool) {
        self.line(if is_playing { "[playing]" } else { "[paused]" });
    }

    fn update_progress(&mut self, progress: &Progress) {
        self.line(&format!(
            "  {} / {} ({}%)",
            progress.position_text, progress.duration_text, progress.percent
        ));
    }

    fn update_navigation(&mut self, can_go_previous: bool, can_go_next: bool) {
        let previous = if can_go_previous { "prev" } else { "----" };
        let next = if can_go_next { "next" } else { "----" };
        self.line(&format!("  [{previous}] [{next}]"));
    }

    fn update_shuffle(&mut self, enabled: bool) {
        self.line(&format!("  shuffle {}", if enabled { "on" } else { "off" }));
    }

    fn update_repeat(&mut self, mode: RepeatMode) {
        self.line(&format!("  repeat {mode}"));
    }

    fn show_finished(&mut self) {
        self.line("End of queue");
    }

    fn show_error(&mut self, message: &str) {
        self.line(&format!("error: {message}"));
    }
}
