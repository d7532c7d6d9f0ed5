//! Hand-written catalog double shared by the unit tests

use async_trait::async_trait;
use bridge_traits::catalog::{
    CatalogAlbum, CatalogArtist, CatalogPlaylist, CatalogService, CatalogTrack,
};
use bridge_traits::error::{BridgeError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct StubCatalog {
    pub tracks: Vec<CatalogTrack>,
    pub artists: HashMap<String, CatalogArtist>,
    pub albums: HashMap<String, CatalogAlbum>,
    /// Keyed by `(artist_name, album_name)`
    pub search_hits: HashMap<(String, String), CatalogAlbum>,
    pub calls: Mutex<Vec<String>>,
}

impl StubCatalog {
    pub fn with_artist(mut self, id: &str, name: &str) -> Self {
        self.artists.insert(
            id.to_string(),
            CatalogArtist {
                external_id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_album(mut self, album: CatalogAlbum) -> Self {
        self.albums.insert(album.external_id.clone(), album);
        self
    }

    pub fn with_search_hit(mut self, artist: &str, album: &str, hit: CatalogAlbum) -> Self {
        self.search_hits
            .insert((artist.to_string(), album.to_string()), hit);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn album(id: &str, artist_id: &str, album_type: &str, released: Option<NaiveDate>) -> CatalogAlbum {
    CatalogAlbum {
        external_id: id.to_string(),
        name: format!("Album {}", id),
        album_type: album_type.to_string(),
        release_date: released,
        artist_external_id: artist_id.to_string(),
        artist_name: format!("Artist {}", artist_id),
    }
}

#[async_trait]
impl CatalogService for StubCatalog {
    fn service_name(&self) -> &str {
        "stub"
    }

    async fn download_playlist(
        &self,
        external_playlist_id: &str,
    ) -> Result<(CatalogPlaylist, Vec<CatalogTrack>)> {
        self.record(format!("download_playlist:{}", external_playlist_id));
        Ok((
            CatalogPlaylist {
                external_id: external_playlist_id.to_string(),
                name: "Stub playlist".to_string(),
                description: String::new(),
            },
            self.tracks.clone(),
        ))
    }

    async fn fetch_artist(&self, external_artist_id: &str) -> Result<CatalogArtist> {
        self.record(format!("fetch_artist:{}", external_artist_id));
        self.artists
            .get(external_artist_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(format!("Artist {}", external_artist_id)))
    }

    async fn fetch_album(&self, external_album_id: &str) -> Result<CatalogAlbum> {
        self.record(format!("fetch_album:{}", external_album_id));
        self.albums
            .get(external_album_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(format!("Album {}", external_album_id)))
    }

    async fn search_album(&self, artist_name: &str, album_name: &str) -> Result<Option<CatalogAlbum>> {
        self.record(format!("search_album:{}/{}", artist_name, album_name));
        Ok(self
            .search_hits
            .get(&(artist_name.to_string(), album_name.to_string()))
            .cloned())
    }
}
