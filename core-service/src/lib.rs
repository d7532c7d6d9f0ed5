//! Core service façade and bootstrap helpers.
//!
//! This crate wires configuration, the SQLite store, the catalog providers and
//! the reconciliation engine together. Hosts build a [`CoreConfig`], call
//! [`CoreService::bootstrap`] and then drive reconciliation through
//! [`CoreService::download_playlist`]. Desktop builds enable the
//! `desktop-shims` feature so that the default `reqwest` HTTP client is used
//! when none is injected.

pub mod error;

pub use error::{CoreError, Result};

pub use core_runtime::config::{CatalogConfig, CoreConfig, CoreConfigBuilder};
pub use core_sync::DownloadResult;

use std::sync::Arc;

use bridge_traits::catalog::{CatalogRegistry, CatalogService};
use bridge_traits::time::{Clock, SystemClock};
use core_library::models::{Playlist, Release, Track};
use core_library::repositories::{Page, PageRequest};
use core_library::{create_pool, DatabaseConfig};
use core_runtime::init_logging;
use core_sync::{PlaylistDownloader, ReleaseClassifier, Repositories};
use provider_spotify::SpotifyConnector;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    pool: SqlitePool,
    repositories: Repositories,
    catalogs: CatalogRegistry,
    master: Arc<dyn CatalogService>,
    classifier: ReleaseClassifier,
    clock: Arc<dyn Clock>,
}

impl CoreService {
    /// Bootstrap the core from a validated configuration.
    ///
    /// Installs logging unless a subscriber is already present, then opens
    /// and migrates the database. The Spotify connector serves both as the
    /// playlist catalog for `spotify` playlists and as the master catalog.
    ///
    /// ```ignore
    /// use core_service::{CoreConfig, CoreService};
    ///
    /// let config = CoreConfig::builder()
    ///     .database_path("/data/playlists.db")
    ///     .catalog_access_token(token)
    ///     .build()?;
    /// let core = CoreService::bootstrap(config).await?;
    /// ```
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        if let Err(e) = init_logging(config.logging.clone()) {
            debug!(error = %e, "Keeping existing tracing subscriber");
        }

        let pool = create_pool(DatabaseConfig::new(config.database_path.clone())).await?;

        let spotify: Arc<dyn CatalogService> = Arc::new(SpotifyConnector::from_config(
            config.http_client.clone(),
            &config.catalog,
        ));
        let catalogs = CatalogRegistry::new().with_catalog(spotify.clone());

        info!(
            database = %config.database_path.display(),
            services = ?catalogs.services(),
            release_window_days = config.release_window_days,
            "Core service initialized"
        );

        Ok(Self::from_parts(
            pool,
            catalogs,
            spotify,
            ReleaseClassifier::from_config(&config),
        ))
    }

    /// Assemble a service from an open pool and explicit catalogs.
    pub fn from_parts(
        pool: SqlitePool,
        catalogs: CatalogRegistry,
        master: Arc<dyn CatalogService>,
        classifier: ReleaseClassifier,
    ) -> Self {
        Self {
            repositories: Repositories::sqlite(pool.clone()),
            pool,
            catalogs,
            master,
            classifier,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for reconciliation runs.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an additional playlist catalog.
    pub fn register_catalog(&mut self, catalog: Arc<dyn CatalogService>) {
        info!(service = catalog.service_name(), "Registered catalog");
        self.catalogs.register(catalog);
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start tracking a catalog playlist, or return it if already tracked.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownService`] if no catalog serves `service`.
    #[instrument(skip(self))]
    pub async fn add_playlist(
        &self,
        service: &str,
        external_id: &str,
        name: &str,
    ) -> Result<Playlist> {
        if self.catalogs.get(service).is_none() {
            return Err(CoreError::UnknownService(service.to_string()));
        }

        let service = service.to_lowercase();
        if let Some(existing) = self
            .repositories
            .playlists
            .find_by_external_id(&service, external_id)
            .await?
        {
            return Ok(existing);
        }

        let playlist = Playlist::new(external_id.to_string(), service, name.to_string());
        self.repositories.playlists.insert(&playlist).await?;
        info!(playlist_id = %playlist.id, "Playlist added");

        Ok(playlist)
    }

    pub async fn playlists(&self, page_request: PageRequest) -> Result<Page<Playlist>> {
        Ok(self.repositories.playlists.list(page_request).await?)
    }

    pub async fn playlist_tracks(
        &self,
        playlist_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Track>> {
        Ok(self
            .repositories
            .tracks
            .query_by_playlist(playlist_id, page_request)
            .await?)
    }

    /// Releases observed in a playlist, most recent first.
    pub async fn playlist_releases(
        &self,
        playlist_id: &str,
        page_request: PageRequest,
    ) -> Result<Page<Release>> {
        Ok(self
            .repositories
            .releases
            .query_by_playlist(playlist_id, page_request)
            .await?)
    }

    /// Reconcile one playlist against its catalog.
    ///
    /// Each call runs on a fresh [`PlaylistDownloader`], so concurrent calls
    /// for different playlists share nothing but the database.
    pub async fn download_playlist(&self, playlist_id: &str) -> DownloadResult {
        self.downloader().download(playlist_id).await
    }

    fn downloader(&self) -> PlaylistDownloader {
        PlaylistDownloader::new(
            self.repositories.clone(),
            self.catalogs.clone(),
            self.master.clone(),
            self.classifier,
            self.clock.clone(),
        )
    }
}
