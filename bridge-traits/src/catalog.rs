//! Remote Music Catalog Abstraction
//!
//! A catalog is the remote source of truth for playlists, artists and albums
//! (Spotify, or any service that can list a playlist's tracks). The core never
//! talks to a catalog API directly; it consumes this trait.
//!
//! Two roles exist:
//! - the catalog that *owns* a playlist, picked by the playlist's `service`
//!   name through a [`CatalogRegistry`]
//! - the *master data* catalog, which resolves artist and album identities for
//!   every track regardless of where the playlist lives

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Playlist metadata as reported by a catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    pub external_id: String,
    pub name: String,
    pub description: String,
}

/// Track as reported by a catalog, before identity resolution
///
/// `master_data` is set when the catalog is itself the master catalog, in
/// which case the artist and album identifiers are already canonical.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogTrack {
    /// Catalog track identifier
    pub external_id: String,
    /// Track title
    pub name: String,
    /// Whether canonical artist/album identity is already attached
    pub master_data: bool,
    /// Master catalog artist identifier (empty until resolved)
    pub artist_external_id: String,
    /// Master catalog album identifier (empty until resolved)
    pub album_external_id: String,
    /// Artist display name as reported by the catalog
    pub artist_name: String,
    /// Album display name as reported by the catalog
    pub album_name: String,
}

impl CatalogTrack {
    /// Validate track data
    ///
    /// A track without master data must at least carry the artist and album
    /// names, otherwise there is nothing to resolve it against.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.external_id.trim().is_empty() {
            return Err("Track external id cannot be empty".to_string());
        }

        if !self.master_data
            && (self.artist_name.trim().is_empty() || self.album_name.trim().is_empty())
        {
            return Err("Missing artist name or album name".to_string());
        }

        Ok(())
    }

    /// Whether both master catalog identifiers are present
    pub fn has_identity(&self) -> bool {
        !self.artist_external_id.trim().is_empty() && !self.album_external_id.trim().is_empty()
    }
}

/// Artist record from the master catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogArtist {
    pub external_id: String,
    pub name: String,
}

/// Album record from the master catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAlbum {
    pub external_id: String,
    pub name: String,
    /// Catalog album type (`album`, `single`, `compilation`, ...)
    pub album_type: String,
    pub release_date: Option<NaiveDate>,
    /// Primary artist
    pub artist_external_id: String,
    pub artist_name: String,
}

/// Remote music catalog
///
/// # Example
///
/// ```ignore
/// let (playlist, tracks) = catalog.download_playlist("37i9dQZF1DXcBWIGoYBM5M").await?;
/// for track in tracks {
///     println!("{} - {}", track.artist_name, track.name);
/// }
/// ```
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Name of the service, matched against `Playlist::service`
    fn service_name(&self) -> &str;

    /// Fetch playlist metadata and its full, ordered track list
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist cannot be fetched or parsed
    async fn download_playlist(
        &self,
        external_playlist_id: &str,
    ) -> Result<(CatalogPlaylist, Vec<CatalogTrack>)>;

    /// Fetch an artist by catalog identifier
    async fn fetch_artist(&self, external_artist_id: &str) -> Result<CatalogArtist>;

    /// Fetch an album by catalog identifier
    async fn fetch_album(&self, external_album_id: &str) -> Result<CatalogAlbum>;

    /// Search for an album by artist and album name
    ///
    /// Returns `Ok(None)` when the catalog has no match.
    async fn search_album(&self, artist_name: &str, album_name: &str)
        -> Result<Option<CatalogAlbum>>;
}

/// Catalogs keyed by service name
#[derive(Clone, Default)]
pub struct CatalogRegistry {
    catalogs: HashMap<String, Arc<dyn CatalogService>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog under its own service name
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogService>) -> Self {
        self.register(catalog);
        self
    }

    pub fn register(&mut self, catalog: Arc<dyn CatalogService>) {
        self.catalogs
            .insert(catalog.service_name().to_lowercase(), catalog);
    }

    /// Look up the catalog for a service name (case-insensitive)
    pub fn get(&self, service: &str) -> Option<Arc<dyn CatalogService>> {
        self.catalogs.get(&service.to_lowercase()).cloned()
    }

    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.catalogs.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for CatalogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogRegistry")
            .field("services", &self.services())
            .finish()
    }
}
