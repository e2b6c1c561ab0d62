//! Transport state machine
//!
//! Shuffle/repeat policy, play state and position for the current track.
//! `TransportState` never talks to the engine itself: the session applies its
//! decisions and feeds back what the engine actually reports.

use crate::queue::Queue;
use crate::types::{Direction, RepeatMode};
use rand::Rng;

/// What to do when the engine reports the current track has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfTrack {
    /// Repeat One: seek to 0 and resume the same track, cursor untouched
    RestartCurrent,

    /// Move to this index
    Advance(usize),

    /// Nothing left to play (end of queue, repeat off)
    Finished,
}

/// Transport state for one playback session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportState {
    is_playing: bool,
    position_ms: u64,
    duration_ms: u64,
    shuffle_enabled: bool,
    repeat_mode: RepeatMode,
}

impl TransportState {
    pub fn new(shuffle_enabled: bool, repeat_mode: RepeatMode) -> Self {
        Self {
            is_playing: false,
            position_ms: 0,
            duration_ms: 0,
            shuffle_enabled,
            repeat_mode,
        }
    }

    /// Flip shuffle, returning the new value
    ///
    /// The current track is untouched; only later next/previous resolution changes.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle_enabled = !self.shuffle_enabled;
        self.shuffle_enabled
    }

    /// Advance Off → All → One → Off, returning the new mode
    pub fn toggle_repeat(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.cycle();
        self.repeat_mode
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle_enabled = enabled;
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    pub fn resolve_next<R: Rng + ?Sized>(&self, queue: &Queue, rng: &mut R) -> Option<usize> {
        queue.resolve(Direction::Next, self.shuffle_enabled, self.repeat_mode, rng)
    }

    pub fn resolve_previous<R: Rng + ?Sized>(&self, queue: &Queue, rng: &mut R) -> Option<usize> {
        queue.resolve(
            Direction::Previous,
            self.shuffle_enabled,
            self.repeat_mode,
            rng,
        )
    }

    /// End-of-track policy
    pub fn on_track_ended<R: Rng + ?Sized>(&self, queue: &Queue, rng: &mut R) -> EndOfTrack {
        if self.repeat_mode == RepeatMode::One && queue.current().is_some() {
            return EndOfTrack::RestartCurrent;
        }

        match self.resolve_next(queue, rng) {
            Some(index) => EndOfTrack::Advance(index),
            None => EndOfTrack::Finished,
        }
    }

    pub fn can_go_next(&self, queue: &Queue) -> bool {
        queue.can_move(Direction::Next, self.shuffle_enabled, self.repeat_mode)
    }

    pub fn can_go_previous(&self, queue: &Queue) -> bool {
        queue.can_move(Direction::Previous, self.shuffle_enabled, self.repeat_mode)
    }

    /// Clamp a requested seek target into `[0, duration]`
    pub fn clamp_seek(&self, position_ms: i64) -> u64 {
        (position_ms.max(0) as u64).min(self.duration_ms)
    }

    /// Record the engine's reported play state; returns true if it changed
    pub fn set_playing(&mut self, is_playing: bool) -> bool {
        let changed = self.is_playing != is_playing;
        self.is_playing = is_playing;
        changed
    }

    /// Record a position reading, clamped to the known duration
    pub fn set_position(&mut self, position_ms: u64) {
        self.position_ms = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        if duration_ms > 0 {
            self.position_ms = self.position_ms.min(duration_ms);
        }
    }

    /// Reset position for a freshly loaded track
    pub fn reset_for_track(&mut self, duration_ms: u64) {
        self.position_ms = 0;
        self.duration_ms = duration_ms;
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }
}

impl Default for TransportState {
    fn default() -> Self {
        Self::new(false, RepeatMode::Off)
    }
}
