//! Platform playback engine seam
//!
//! Abstracts the decode/render engine (a media framework player on mobile,
//! a decoder + audio output elsewhere). The session drives it through
//! [`Engine`] and hears back through [`EngineListener`].

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing loaded, or loading failed
    Idle,
    /// Loaded, filling buffers
    Buffering,
    /// Ready to play from the current position
    Ready,
    /// Reached the end of the loaded item
    Ended,
}

/// Callbacks raised by the engine, possibly from its own thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    IsPlayingChanged(bool),
    PlaybackStateChanged(EngineState),
    MediaItemTransitioned { uri: String },
    Error { code: i32, message: String },
}

/// Sending half handed to the engine
///
/// Engine callbacks are delivered as messages so the engine thread never
/// touches session state directly. Emitting after the session is gone is a
/// silent no-op.
#[derive(Debug, Clone)]
pub struct EngineListener {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineListener {
    /// Create a listener and the receiver the session drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: EngineEvent) {
        self.tx.send(event).ok();
    }
}

/// Opaque playback engine
///
/// Command methods may fail synchronously (`Err`) or report failures later
/// through `EngineEvent::Error`; the session handles both. Play state changes
/// must be reported through `EngineEvent::IsPlayingChanged`: the session
/// does not assume `play()`/`pause()` took effect until it hears so.
pub trait Engine: Send {
    /// Replace the current item with the stream at `stream_uri`
    fn load(&mut self, stream_uri: &str) -> Result<()>;

    /// Start buffering the loaded item
    fn prepare(&mut self) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    fn current_position_ms(&self) -> u64;

    /// Duration of the loaded item, 0 while unknown
    fn duration_ms(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// Register where lifecycle events go; replaces any previous listener
    fn set_listener(&mut self, listener: EngineListener);

    /// Free platform resources; the engine is not used afterwards
    fn release(&mut self) {}
}
