//! Song list providers
//!
//! The catalog is the only place tracks come from. It is consumed by the
//! library screen; the playback core only ever sees the `Track`s it returns.

use crate::error::Result;
use crate::types::Track;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Song list provider
///
/// Both operations may fail with a retryable error (network, disk); callers
/// surface the failure and let the user try again.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every track the provider knows about, in display order
    async fn fetch_all(&self) -> Result<Vec<Track>>;

    /// Tracks whose title, artist or album contains `query` (case-insensitive)
    ///
    /// A blank query returns the same list as `fetch_all`.
    async fn search(&self, query: &str) -> Result<Vec<Track>>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    async fn fetch_all(&self) -> Result<Vec<Track>> {
        (**self).fetch_all().await
    }

    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        (**self).search(query).await
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tracks: Arc<[Track]>,
}

impl MemoryCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: tracks.into(),
        }
    }

    /// Load a JSON array of tracks
    ///
    /// Every entry goes through track validation, so a file containing a
    /// track without a stream URI is rejected as a whole.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let tracks: Vec<Track> = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), count = tracks.len(), "Loaded catalog file");
        Ok(Self::new(tracks))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn filter(&self, query: &str) -> Vec<Track> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.tracks.to_vec();
        }

        self.tracks
            .iter()
            .filter(|track| track.matches_lowercase(&needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn fetch_all(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.to_vec())
    }

    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let found = self.filter(query);
        debug!(query = %query, results = found.len(), "Catalog search");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewTrack, TrackId};
    use std::io::Write;

    fn track(id: &str, title: &str, artist: &str, album: &str) -> Track {
        Track::new(NewTrack {
            id: TrackId::new(id),
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            duration_ms: 200_000,
            stream_uri: format!("https://example.com/{id}.mp3"),
            ..Default::default()
        })
        .unwrap()
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            track("1", "Blinding Lights", "The Weeknd", "After Hours"),
            track("2", "Watermelon Sugar", "Harry Styles", "Fine Line"),
            track("3", "Levitating", "Dua Lipa", "Future Nostalgia"),
            track("7", "As It Was", "Harry Styles", "Harry's House"),
        ])
    }

    #[tokio::test]
    async fn fetch_all_returns_everything_in_order() {
        let songs = catalog().fetch_all().await.unwrap();
        let ids: Vec<&str> = songs.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "7"]);
    }

    #[tokio::test]
    async fn blank_query_returns_all_songs() {
        let catalog = catalog();
        assert_eq!(catalog.search("").await.unwrap().len(), 4);
        assert_eq!(catalog.search("   ").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let catalog = catalog();

        let by_artist = catalog.search("harry").await.unwrap();
        assert_eq!(by_artist.len(), 2);
        assert!(by_artist.iter().all(|t| t.artist().contains("Harry")));

        let by_album = catalog.search("NOSTALGIA").await.unwrap();
        assert_eq!(by_album.len(), 1);
        assert_eq!(by_album[0].title(), "Levitating");

        assert!(catalog.search("nothing like this").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shared_catalog_delegates() {
        let shared: Arc<dyn Catalog> = Arc::new(catalog());
        assert_eq!(shared.fetch_all().await.unwrap().len(), 4);
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","title":"A","stream_uri":"file:///a.mp3","duration_ms":1000}}]"#
        )
        .unwrap();

        let catalog = MemoryCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn json_file_with_unplayable_track_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id":"a","title":"A","stream_uri":""}}]"#).unwrap();

        assert!(MemoryCatalog::from_json_file(file.path()).is_err());
    }
}
