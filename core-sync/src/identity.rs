//! Artist and album identity resolution
//!
//! Maps master catalog identifiers onto local rows, creating the rows from
//! master catalog data the first time an identifier is seen.

use crate::error::{EntityKind, Result, SyncError};
use bridge_traits::catalog::CatalogService;
use core_library::models::{Album, Artist};
use core_library::repositories::{AlbumRepository, ArtistRepository};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Get-or-create for artists and albums keyed by master catalog id
pub struct IdentityResolver {
    catalog: Arc<dyn CatalogService>,
    artists: Arc<dyn ArtistRepository>,
    albums: Arc<dyn AlbumRepository>,
}

impl IdentityResolver {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        artists: Arc<dyn ArtistRepository>,
        albums: Arc<dyn AlbumRepository>,
    ) -> Self {
        Self {
            catalog,
            artists,
            albums,
        }
    }

    /// Return the local artist for `external_id`, creating it if unseen
    ///
    /// A created row is stamped with `now`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Fetch`] if the master catalog lookup fails
    /// - [`SyncError::Persist`] if the repository read or insert fails
    #[instrument(skip(self))]
    pub async fn resolve_artist(&self, external_id: &str, now: i64) -> Result<Artist> {
        if let Some(artist) = self.find_artist(external_id).await? {
            return Ok(artist);
        }

        let remote = self
            .catalog
            .fetch_artist(external_id)
            .await
            .map_err(|e| SyncError::fetch(EntityKind::Artist, external_id, e))?;

        let mut artist = Artist::new(external_id.to_string(), remote.name);
        artist.created_at = now;
        artist.updated_at = now;

        match self.artists.insert(&artist).await {
            Ok(()) => {
                info!(artist_id = %artist.id, name = %artist.name, "Created artist");
                Ok(artist)
            }
            // Another run inserted the same artist first
            Err(e) if e.is_unique_violation() => self
                .find_artist(external_id)
                .await?
                .ok_or_else(|| SyncError::persist(EntityKind::Artist, external_id, e)),
            Err(e) => Err(SyncError::persist(EntityKind::Artist, external_id, e)),
        }
    }

    /// Return the local album for `external_id` and whether this call created it
    ///
    /// A new album is attached to `artist_id` and stamped with `now`. The
    /// flag is `true` only when the row was inserted by this call.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_artist`](Self::resolve_artist).
    #[instrument(skip(self))]
    pub async fn resolve_album(
        &self,
        external_id: &str,
        artist_id: &str,
        now: i64,
    ) -> Result<(Album, bool)> {
        if let Some(album) = self.find_album(external_id).await? {
            return Ok((album, false));
        }

        let remote = self
            .catalog
            .fetch_album(external_id)
            .await
            .map_err(|e| SyncError::fetch(EntityKind::Album, external_id, e))?;

        let mut album = Album::new(
            external_id.to_string(),
            artist_id.to_string(),
            remote.name,
            remote.album_type,
            remote.release_date,
        );
        album.created_at = now;
        album.updated_at = now;

        match self.albums.insert(&album).await {
            Ok(()) => {
                info!(
                    album_id = %album.id,
                    name = %album.name,
                    album_type = %album.album_type,
                    "Created album"
                );
                Ok((album, true))
            }
            Err(e) if e.is_unique_violation() => self
                .find_album(external_id)
                .await?
                .map(|existing| (existing, false))
                .ok_or_else(|| SyncError::persist(EntityKind::Album, external_id, e)),
            Err(e) => Err(SyncError::persist(EntityKind::Album, external_id, e)),
        }
    }

    /// Store the master catalog's spelling of an artist name
    ///
    /// Blank or identical names leave the row untouched.
    pub async fn refresh_artist_name(
        &self,
        mut artist: Artist,
        catalog_name: &str,
        now: i64,
    ) -> Result<Artist> {
        let catalog_name = catalog_name.trim();
        if catalog_name.is_empty() || catalog_name == artist.name {
            return Ok(artist);
        }

        debug!(
            artist_id = %artist.id,
            old_name = %artist.name,
            new_name = %catalog_name,
            "Refreshing artist name"
        );

        artist.name = catalog_name.to_string();
        artist.updated_at = now;
        self.artists
            .update(&artist)
            .await
            .map_err(|e| SyncError::persist(EntityKind::Artist, &artist.id, e))?;

        Ok(artist)
    }

    async fn find_artist(&self, external_id: &str) -> Result<Option<Artist>> {
        self.artists
            .find_by_external_id(external_id)
            .await
            .map_err(|e| SyncError::persist(EntityKind::Artist, external_id, e))
    }

    async fn find_album(&self, external_id: &str) -> Result<Option<Album>> {
        self.albums
            .find_by_external_id(external_id)
            .await
            .map_err(|e| SyncError::persist(EntityKind::Album, external_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{album, StubCatalog};
    use chrono::NaiveDate;
    use core_library::create_test_pool;
    use core_library::repositories::{SqliteAlbumRepository, SqliteArtistRepository};

    const NOW: i64 = 1_717_200_000;

    async fn setup(catalog: StubCatalog) -> (IdentityResolver, Arc<StubCatalog>, sqlx::SqlitePool) {
        let pool = create_test_pool().await.unwrap();
        let catalog = Arc::new(catalog);
        let resolver = IdentityResolver::new(
            catalog.clone(),
            Arc::new(SqliteArtistRepository::new(pool.clone())),
            Arc::new(SqliteAlbumRepository::new(pool.clone())),
        );
        (resolver, catalog, pool)
    }

    #[tokio::test]
    async fn test_resolve_artist_creates_then_reuses() {
        let (resolver, catalog, _pool) =
            setup(StubCatalog::default().with_artist("artist-1", "Phoebe Bridgers")).await;

        let created = resolver.resolve_artist("artist-1", NOW).await.unwrap();
        assert_eq!(created.name, "Phoebe Bridgers");
        assert_eq!(created.external_id, "artist-1");
        assert_eq!(created.created_at, NOW);
        assert_eq!(created.updated_at, NOW);

        let again = resolver.resolve_artist("artist-1", NOW).await.unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(catalog.calls(), vec!["fetch_artist:artist-1"]);
    }

    #[tokio::test]
    async fn test_resolve_artist_fetch_failure() {
        let (resolver, _catalog, pool) = setup(StubCatalog::default()).await;

        let err = resolver.resolve_artist("missing", NOW).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(
            SqliteArtistRepository::new(pool).count().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_resolve_artist_persist_failure() {
        // A blank name fails model validation on insert
        let (resolver, _catalog, _pool) =
            setup(StubCatalog::default().with_artist("artist-1", "  ")).await;

        let err = resolver.resolve_artist("artist-1", NOW).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persist);
    }

    #[tokio::test]
    async fn test_resolve_album_reports_creation() {
        let released = NaiveDate::from_ymd_opt(2024, 5, 20);
        let (resolver, catalog, _pool) = setup(
            StubCatalog::default()
                .with_artist("artist-1", "Phoebe Bridgers")
                .with_album(album("album-1", "artist-1", "album", released)),
        )
        .await;

        let artist = resolver.resolve_artist("artist-1", NOW).await.unwrap();

        let (album, created) = resolver.resolve_album("album-1", &artist.id, NOW).await.unwrap();
        assert!(created);
        assert_eq!(album.artist_id, artist.id);
        assert_eq!(album.created_at, NOW);
        assert_eq!(album.updated_at, NOW);
        assert_eq!(album.album_type, "album");
        assert!(album.released_at().is_some());

        let (again, created) = resolver.resolve_album("album-1", &artist.id, NOW).await.unwrap();
        assert!(!created);
        assert_eq!(again.id, album.id);
        assert_eq!(
            catalog.calls(),
            vec!["fetch_artist:artist-1", "fetch_album:album-1"]
        );
    }

    #[tokio::test]
    async fn test_resolve_album_fetch_failure() {
        let (resolver, _catalog, _pool) =
            setup(StubCatalog::default().with_artist("artist-1", "Phoebe Bridgers")).await;
        let artist = resolver.resolve_artist("artist-1", NOW).await.unwrap();

        let err = resolver.resolve_album("nope", &artist.id, NOW).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn test_refresh_artist_name() {
        let (resolver, _catalog, pool) =
            setup(StubCatalog::default().with_artist("artist-1", "Phoebe Bridgers")).await;
        let artist = resolver.resolve_artist("artist-1", NOW).await.unwrap();

        let unchanged = resolver
            .refresh_artist_name(artist.clone(), "", 10)
            .await
            .unwrap();
        assert_eq!(unchanged, artist);

        let renamed = resolver
            .refresh_artist_name(artist.clone(), "boygenius", 10)
            .await
            .unwrap();
        assert_eq!(renamed.name, "boygenius");

        let stored = SqliteArtistRepository::new(pool)
            .find_by_id(&artist.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "boygenius");
        assert_eq!(stored.updated_at, 10);
    }
}
