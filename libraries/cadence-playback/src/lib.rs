//! Cadence - Playback Management
//!
//! Queue, transport and background session management for Cadence.
//!
//! This crate provides:
//! - An immutable, cursor-based playback queue
//! - Shuffle and repeat (Off, All, One) transport policy
//! - A playback session that owns the engine and keeps a notification in sync
//! - A background host that runs the session on its own task
//! - A UI-side connector that buffers commands until the session is bound
//!
//! # Architecture
//!
//! The platform decode/render engine sits behind the [`Engine`] trait and the
//! now-playing surface behind [`NotificationSurface`]. Connectors and the
//! session only exchange messages: [`SessionCommand`] one way,
//! [`SessionEvent`] the other.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{NewTrack, Track, TrackId};
//! use cadence_playback::{
//!     ConnectorEvent, LogNotifier, PlaybackConfig, SessionConnector, SessionEvent,
//!     SessionHost, SimulatedEngine,
//! };
//!
//! # async fn example() -> cadence_playback::Result<()> {
//! let config = PlaybackConfig::default();
//! let handle = SessionHost::spawn(
//!     SimulatedEngine::new(),
//!     Box::new(LogNotifier::new()),
//!     config.clone(),
//! );
//!
//! let mut connector = SessionConnector::new(handle, config.retry);
//! connector.connect();
//!
//! let track = Track::new(NewTrack {
//!     id: TrackId::new("1"),
//!     title: "Song".to_string(),
//!     stream_uri: "https://example.com/1.mp3".to_string(),
//!     ..Default::default()
//! })?;
//! // Buffered until the bind completes
//! connector.play_song(track)?;
//!
//! loop {
//!     match connector.next_event().await {
//!         ConnectorEvent::Session(SessionEvent::QueueFinished) => break,
//!         event => println!("{event:?}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod connector;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod notification;
pub mod queue;
pub mod session;
pub mod simulated;
pub mod transport;
pub mod types;

pub use connector::{ConnectionState, ConnectorEvent, SessionConnector};
pub use engine::{Engine, EngineEvent, EngineListener, EngineState};
pub use error::{PlaybackError, Result};
pub use events::{SessionCommand, SessionEvent};
pub use host::{SessionBinder, SessionHandle, SessionHost, SessionLink, SessionSender};
pub use notification::{LogNotifier, NotificationAction, NotificationState, NotificationSurface};
pub use queue::Queue;
pub use session::PlaybackSession;
pub use simulated::SimulatedEngine;
pub use transport::{EndOfTrack, TransportState};
pub use types::{Direction, PlaybackConfig, RepeatMode, RetryPolicy, SessionSnapshot};
