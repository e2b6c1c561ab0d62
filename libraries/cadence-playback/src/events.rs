//! Session Commands and Events
//!
//! Everything crossing the boundary between a UI-side connector and the
//! background session travels as one of these messages:
//! - `SessionCommand` flows toward the session (one at a time, in order)
//! - `SessionEvent` is broadcast back to every bound connector

use crate::notification::NotificationAction;
use crate::queue::Queue;
use crate::types::RepeatMode;
use cadence_core::Track;
use serde::{Deserialize, Serialize};

/// Commands accepted by a playback session
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Replace the queue and start playing its current track
    PlayQueue(Queue),
    PlayPause,
    Play,
    Pause,
    /// Pause, rewind and clear the notification
    Stop,
    Next,
    Previous,
    /// Seek within the current track; clamped to `[0, duration]`
    SeekTo(i64),
    ToggleShuffle,
    ToggleRepeat,
    SetShuffle(bool),
    SetRepeat(RepeatMode),
    /// Action raised from the notification surface
    Notification(NotificationAction),
}

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new track was loaded
    TrackChanged {
        track: Track,
        /// Cursor position in the queue
        index: usize,
        queue_len: usize,
    },

    /// The engine started or stopped producing audio
    PlayingChanged { is_playing: bool },

    /// Periodic position reading, only while playing
    PositionChanged { position_ms: u64, duration_ms: u64 },

    ShuffleChanged { enabled: bool },

    RepeatChanged { mode: RepeatMode },

    /// Enablement of the previous/next controls
    ///
    /// Emitted whenever the track, shuffle or repeat mode changes.
    NavigationChanged {
        can_go_previous: bool,
        can_go_next: bool,
    },

    /// The last track ended and there is nothing to advance to
    QueueFinished,

    /// Playback was stopped and rewound
    Stopped,

    /// The engine reported an error; the session keeps running
    Error { code: i32, message: String },
}

impl SessionEvent {
    /// Whether this event changes what a now-playing surface shows
    pub fn affects_notification(&self) -> bool {
        matches!(
            self,
            SessionEvent::TrackChanged { .. }
                | SessionEvent::PlayingChanged { .. }
                | SessionEvent::NavigationChanged { .. }
        )
    }
}
