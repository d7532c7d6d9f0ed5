//! Master data resolution
//!
//! Tracks from a catalog other than the master catalog arrive with display
//! names only. Before they can be keyed locally they need canonical artist
//! and album identifiers, which this module obtains from the master catalog.

use crate::error::{Result, SyncError};
use bridge_traits::catalog::{CatalogAlbum, CatalogService, CatalogTrack};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Fills in canonical identity on tracks that lack it
pub struct MasterDataResolver {
    catalog: Arc<dyn CatalogService>,
}

impl MasterDataResolver {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Resolve artist and album identity for `track` in place
    ///
    /// A known album id is looked up directly; otherwise, or when that lookup
    /// fails, the master catalog is searched by artist and album name. On
    /// success the track carries the canonical ids and names and is marked
    /// `master_data`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Resolution`] when neither lookup yields an album
    /// with an identified artist. The caller skips the track.
    #[instrument(skip(self, track), fields(track_id = %track.external_id))]
    pub async fn resolve(&self, track: &mut CatalogTrack) -> Result<()> {
        let direct = if track.album_external_id.is_empty() {
            None
        } else {
            match self.catalog.fetch_album(&track.album_external_id).await {
                Ok(album) => Some(album),
                Err(e) => {
                    debug!(
                        album_id = %track.album_external_id,
                        error = %e,
                        "Album lookup by id failed, falling back to search"
                    );
                    None
                }
            }
        };

        let album = match direct {
            Some(album) => album,
            None => self.search(track).await?,
        };

        if album.external_id.is_empty() || album.artist_external_id.is_empty() {
            return Err(SyncError::Resolution {
                track_id: track.external_id.clone(),
                message: format!("Album '{}' has no canonical artist", album.name),
            });
        }

        debug!(
            album_id = %album.external_id,
            artist_id = %album.artist_external_id,
            "Resolved master data"
        );

        track.album_external_id = album.external_id;
        track.album_name = album.name;
        track.artist_external_id = album.artist_external_id;
        track.artist_name = album.artist_name;
        track.master_data = true;

        Ok(())
    }

    async fn search(&self, track: &CatalogTrack) -> Result<CatalogAlbum> {
        let unresolved = |message: String| SyncError::Resolution {
            track_id: track.external_id.clone(),
            message,
        };

        if track.artist_name.trim().is_empty() || track.album_name.trim().is_empty() {
            return Err(unresolved("No artist or album name to search for".to_string()));
        }

        match self
            .catalog
            .search_album(&track.artist_name, &track.album_name)
            .await
        {
            Ok(Some(album)) => Ok(album),
            Ok(None) => Err(unresolved(format!(
                "No album '{}' by '{}' in master catalog",
                track.album_name, track.artist_name
            ))),
            Err(e) => Err(unresolved(format!("Album search failed: {}", e))),
        }
    }
}
