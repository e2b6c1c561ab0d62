//! Cadence Core
//!
//! Platform-agnostic domain types, the song catalog seam, and error handling
//! shared by the playback library and the front ends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist` and their identifiers
//! - **Catalog**: the `Catalog` data-source trait and an in-memory implementation
//! - **Display helpers**: millisecond formatting for lists and seek bars
//! - **Error Handling**: unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{NewTrack, Track, TrackId};
//!
//! let track = Track::new(NewTrack {
//!     id: TrackId::new("1"),
//!     title: "My Favorite Song".to_string(),
//!     duration_ms: 180_000,
//!     stream_uri: "https://example.com/song.mp3".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(track.formatted_duration(), "03:00");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use catalog::{Catalog, MemoryCatalog};
pub use error::{CadenceError, Result};
pub use time::{format_clock, format_duration, format_total_duration, progress_percent};
pub use types::{NewTrack, Playlist, PlaylistId, Track, TrackId};
