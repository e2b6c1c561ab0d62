//! Persistent now-playing surface
//!
//! The session keeps a notification (lock screen, tray, status line) in sync
//! with what is playing, and accepts transport actions back from it.

use cadence_core::Track;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// What the surface should currently display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationState {
    pub track: Track,
    pub is_playing: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

/// User action raised from the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationAction {
    PlayPause,
    Previous,
    Next,
    Stop,
}

impl NotificationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationAction::PlayPause => "play_pause",
            NotificationAction::Previous => "previous",
            NotificationAction::Next => "next",
            NotificationAction::Stop => "stop",
        }
    }
}

impl fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play_pause" | "play" | "pause" => Ok(NotificationAction::PlayPause),
            "previous" | "prev" => Ok(NotificationAction::Previous),
            "next" => Ok(NotificationAction::Next),
            "stop" => Ok(NotificationAction::Stop),
            other => Err(format!("unknown notification action '{other}'")),
        }
    }
}

/// Platform notification surface
pub trait NotificationSurface: Send {
    /// Show or refresh the surface
    fn update(&mut self, state: &NotificationState);

    /// Remove the surface (session stopped or released)
    fn clear(&mut self);
}

/// Surface that renders through `tracing`
#[derive(Debug, Default)]
pub struct LogNotifier {
    last: Option<NotificationState>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently displayed state
    pub fn last(&self) -> Option<&NotificationState> {
        self.last.as_ref()
    }
}

impl NotificationSurface for LogNotifier {
    fn update(&mut self, state: &NotificationState) {
        if self.last.as_ref() == Some(state) {
            return;
        }

        info!(
            title = %state.track.title(),
            artist = %state.track.artist(),
            playing = state.is_playing,
            prev = state.can_go_previous,
            next = state.can_go_next,
            "Now playing"
        );
        self.last = Some(state.clone());
    }

    fn clear(&mut self) {
        if self.last.take().is_some() {
            info!("Notification cleared");
        }
    }
}
