//! Catalog selection for the console
//!
//! Either the JSON file named in the configuration or the bundled sample list.

use crate::config::CatalogSettings;
use cadence_core::{MemoryCatalog, Result, Track};
use tracing::info;

const SAMPLE_SONGS: &str = include_str!("../data/songs.json");

/// The bundled sample songs
pub fn sample_tracks() -> Result<Vec<Track>> {
    Ok(serde_json::from_str(SAMPLE_SONGS)?)
}

/// Open the configured catalog
pub fn open_catalog(settings: &CatalogSettings) -> Result<MemoryCatalog> {
    match &settings.path {
        Some(path) => {
            let catalog = MemoryCatalog::from_json_file(path)?;
            info!(path = %path.display(), tracks = catalog.len(), "Using catalog file");
            Ok(catalog)
        }
        None => {
            let catalog = MemoryCatalog::new(sample_tracks()?);
            info!(tracks = catalog.len(), "Using sample catalog");
            Ok(catalog)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Catalog;
    use std::io::Write;

    #[test]
    fn sample_tracks_are_valid() {
        let tracks = sample_tracks().unwrap();
        assert_eq!(tracks.len(), 8);
        assert_eq!(tracks[0].title(), "Blinding Lights");
        assert_eq!(tracks[0].formatted_duration(), "03:20");
        assert!(tracks.iter().all(|t| !t.stream_uri().is_empty()));
    }

    #[tokio::test]
    async fn sample_catalog_searches_artist() {
        let catalog = open_catalog(&CatalogSettings::default()).unwrap();
        let found = catalog.search("harry styles").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn file_catalog_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "a", "title": "Only", "stream_uri": "file:///tmp/only.mp3"}}]"#
        )
        .unwrap();

        let settings = CatalogSettings {
            path: Some(file.path().to_path_buf()),
        };
        assert_eq!(open_catalog(&settings).unwrap().len(), 1);
    }
}
