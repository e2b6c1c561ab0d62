/// Track domain type
use crate::error::{CadenceError, Result};
use crate::time::format_duration;
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Description of a track before validation
///
/// This is the shape catalogs deserialize and callers fill in; it becomes a
/// [`Track`] through [`Track::new`] (or `TryFrom`), which rejects tracks that
/// can never be played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrack {
    pub id: TrackId,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artwork_uri: String,
    pub stream_uri: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub track_number: Option<u32>,
}

/// Playable audio item
///
/// Immutable once constructed. The stream URI is guaranteed non-empty, so any
/// `Track` can be handed to an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NewTrack", into = "NewTrack")]
pub struct Track {
    id: TrackId,
    title: String,
    artist: String,
    album: String,
    duration_ms: u64,
    artwork_uri: String,
    stream_uri: String,
    genre: Option<String>,
    year: Option<u32>,
    track_number: Option<u32>,
}

impl Track {
    /// Validate a track description
    ///
    /// # Errors
    /// `CadenceError::Configuration` if the id or stream URI is blank.
    pub fn new(new: NewTrack) -> Result<Self> {
        if new.id.is_blank() {
            return Err(CadenceError::configuration("track id must not be empty"));
        }
        if new.stream_uri.trim().is_empty() {
            return Err(CadenceError::configuration(format!(
                "track {} has an empty stream URI",
                new.id
            )));
        }

        Ok(Self {
            id: new.id,
            title: new.title,
            artist: new.artist,
            album: new.album,
            duration_ms: new.duration_ms,
            artwork_uri: new.artwork_uri,
            stream_uri: new.stream_uri,
            genre: new.genre,
            year: new.year,
            track_number: new.track_number,
        })
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    /// Track duration in milliseconds, as reported by the catalog
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn artwork_uri(&self) -> &str {
        &self.artwork_uri
    }

    pub fn stream_uri(&self) -> &str {
        &self.stream_uri
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn track_number(&self) -> Option<u32> {
        self.track_number
    }

    /// Duration as `mm:ss`
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_ms)
    }

    /// Secondary display line: `artist • album`
    pub fn artist_album_text(&self) -> String {
        format!("{} \u{2022} {}", self.artist, self.album)
    }

    /// Case-insensitive match against title, artist or album
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.artist.to_lowercase().contains(needle)
            || self.album.to_lowercase().contains(needle)
    }
}

impl TryFrom<NewTrack> for Track {
    type Error = CadenceError;

    fn try_from(new: NewTrack) -> Result<Self> {
        Self::new(new)
    }
}

impl From<Track> for NewTrack {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            title: track.title,
            artist: track.artist,
            album: track.album,
            duration_ms: track.duration_ms,
            artwork_uri: track.artwork_uri,
            stream_uri: track.stream_uri,
            genre: track.genre,
            year: track.year,
            track_number: track.track_number,
        }
    }
}
