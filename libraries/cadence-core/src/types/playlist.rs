/// Playlist domain type
use crate::time::format_total_duration;
use crate::types::{PlaylistId, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named, ordered collection of tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Tracks in play order
    #[serde(default)]
    pub tracks: Vec<Track>,

    /// Cover artwork
    #[serde(default)]
    pub artwork_uri: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new playlist
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            description: None,
            tracks,
            artwork_uri: None,
            created_at: Utc::now(),
        }
    }

    /// Sum of all track durations in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(Track::duration_ms).sum()
    }

    /// Total duration as `h:mm:ss` (or `mm:ss` under an hour)
    pub fn formatted_total_duration(&self) -> String {
        format_total_duration(self.total_duration_ms())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
