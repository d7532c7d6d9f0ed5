//! # Playlist Reconciliation Engine
//!
//! Brings the local record of a playlist in line with its remote catalog.
//!
//! ## Workflow
//!
//! 1. Load the playlist; a missing playlist ends the run with no writes
//! 2. Fetch metadata and tracks from the playlist's catalog; a failure is
//!    logged and the run continues with an empty track list
//! 3. Process every track in order, independently of the others:
//!    validate, resolve master data, dedup, resolve artist and album,
//!    record a release for newly created recent albums, persist the track
//! 4. Refresh the playlist's name and description and stamp `last_changed`
//!    if any track was added
//!
//! Per-track failures are logged and counted, never propagated. Every
//! catalog and repository call is awaited in order; track N+1 starts only
//! after track N is done.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{PlaylistDownloader, ReleaseClassifier, Repositories};
//!
//! let downloader = PlaylistDownloader::new(
//!     Repositories::sqlite(pool),
//!     catalogs,
//!     spotify,
//!     ReleaseClassifier::new(30),
//!     Arc::new(SystemClock),
//! );
//! let result = downloader.download(&playlist_id).await;
//! println!("{} albums, {} singles", result.albums_found, result.singles_found);
//! ```

use crate::error::{EntityKind, ErrorKind, Result, SyncError};
use crate::identity::IdentityResolver;
use crate::master_data::MasterDataResolver;
use crate::release::ReleaseClassifier;
use bridge_traits::catalog::{CatalogPlaylist, CatalogRegistry, CatalogService, CatalogTrack};
use bridge_traits::error::BridgeError;
use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use core_library::models::{Album, AlbumType, Playlist, Release, Track};
use core_library::repositories::{
    AlbumRepository, ArtistRepository, PlaylistRepository, ReleaseRepository,
    SqliteAlbumRepository, SqliteArtistRepository, SqlitePlaylistRepository,
    SqliteReleaseRepository, SqliteTrackRepository, TrackRepository,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Summary of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// At least one new track was persisted
    pub downloaded: bool,
    /// Releases recorded for albums of type `album`
    pub albums_found: u32,
    /// Releases recorded for albums of type `single`
    pub singles_found: u32,
    pub tracks_added: u32,
    pub tracks_skipped: u32,
    /// Set when the catalog fetch failed and the run fell back to an empty track list
    pub catalog_error: Option<String>,
}

impl DownloadResult {
    /// Result of a run whose playlist does not exist
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_degraded(&self) -> bool {
        self.catalog_error.is_some()
    }
}

/// What happened to a single catalog track
#[derive(Debug)]
pub enum TrackOutcome {
    /// Track persisted; `release` is the type of a release recorded with it
    Added { release: Option<AlbumType> },
    /// Already recorded for this playlist
    AlreadyKnown,
    /// Not persisted
    Skipped(SyncError),
}

/// Per-run counters folded from [`TrackOutcome`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub added: u32,
    pub known: u32,
    pub skipped: u32,
    pub albums: u32,
    pub singles: u32,
}

impl RunTally {
    pub fn record(&mut self, outcome: &TrackOutcome) {
        match outcome {
            TrackOutcome::Added { release } => {
                self.added += 1;
                match release {
                    Some(AlbumType::Album) => self.albums += 1,
                    Some(AlbumType::Single) => self.singles += 1,
                    Some(AlbumType::Other) | None => {}
                }
            }
            TrackOutcome::AlreadyKnown => self.known += 1,
            TrackOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Whether the playlist gained any track this run
    pub fn changed(&self) -> bool {
        self.added > 0
    }

    pub fn into_result(self, catalog_error: Option<String>) -> DownloadResult {
        DownloadResult {
            downloaded: self.changed(),
            albums_found: self.albums,
            singles_found: self.singles,
            tracks_added: self.added,
            tracks_skipped: self.skipped,
            catalog_error,
        }
    }
}

/// Repositories the engine reads and writes
#[derive(Clone)]
pub struct Repositories {
    pub playlists: Arc<dyn PlaylistRepository>,
    pub artists: Arc<dyn ArtistRepository>,
    pub albums: Arc<dyn AlbumRepository>,
    pub releases: Arc<dyn ReleaseRepository>,
    pub tracks: Arc<dyn TrackRepository>,
}

impl Repositories {
    /// SQLite repositories sharing one pool
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            playlists: Arc::new(SqlitePlaylistRepository::new(pool.clone())),
            artists: Arc::new(SqliteArtistRepository::new(pool.clone())),
            albums: Arc::new(SqliteAlbumRepository::new(pool.clone())),
            releases: Arc::new(SqliteReleaseRepository::new(pool.clone())),
            tracks: Arc::new(SqliteTrackRepository::new(pool)),
        }
    }
}

/// Reconciles one playlist per [`download`](Self::download) call
///
/// Holds no per-run state; counters live in the run.
pub struct PlaylistDownloader {
    playlists: Arc<dyn PlaylistRepository>,
    releases: Arc<dyn ReleaseRepository>,
    tracks: Arc<dyn TrackRepository>,
    catalogs: CatalogRegistry,
    master_data: MasterDataResolver,
    identity: IdentityResolver,
    classifier: ReleaseClassifier,
    clock: Arc<dyn Clock>,
}

impl PlaylistDownloader {
    /// Create a downloader
    ///
    /// # Arguments
    ///
    /// * `repositories` - Local store
    /// * `catalogs` - Catalogs by service name; a playlist is fetched from the one
    ///   matching its `service`
    /// * `master` - Master catalog for artist and album identity
    /// * `classifier` - New-release policy
    /// * `clock` - Time source, read once per run
    pub fn new(
        repositories: Repositories,
        catalogs: CatalogRegistry,
        master: Arc<dyn CatalogService>,
        classifier: ReleaseClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            playlists: repositories.playlists,
            releases: repositories.releases,
            tracks: repositories.tracks,
            catalogs,
            master_data: MasterDataResolver::new(master.clone()),
            identity: IdentityResolver::new(master, repositories.artists, repositories.albums),
            classifier,
            clock,
        }
    }

    /// Reconcile the playlist with local id `playlist_id`
    ///
    /// Never fails: a missing playlist yields [`DownloadResult::not_found`],
    /// every other failure is logged and reflected in the counters.
    #[instrument(name = "reconcile", skip(self))]
    pub async fn download(&self, playlist_id: &str) -> DownloadResult {
        let now = self.clock.now();

        let mut playlist = match self.load_playlist(playlist_id).await {
            Ok(playlist) => playlist,
            Err(e) => {
                error!(error = %e, kind = %e.kind(), "Cannot reconcile playlist");
                return DownloadResult::not_found();
            }
        };

        let (remote, tracks, catalog_error) = match self.fetch_remote(&playlist).await {
            Ok((remote, tracks)) => (Some(remote), tracks, None),
            Err(e) => {
                warn!(
                    error = %e,
                    service = %playlist.service,
                    external_id = %playlist.external_id,
                    "Catalog fetch failed, continuing with an empty track list"
                );
                (None, Vec::new(), Some(e.to_string()))
            }
        };

        info!(tracks = tracks.len(), "Processing playlist tracks");

        let mut tally = RunTally::default();
        for track in tracks {
            let outcome = self.process_track(&playlist, track, now).await;
            tally.record(&outcome);
        }

        self.finalize(&mut playlist, remote.as_ref(), tally.changed(), now)
            .await;

        let result = tally.into_result(catalog_error);
        info!(
            downloaded = result.downloaded,
            tracks_added = result.tracks_added,
            tracks_known = tally.known,
            tracks_skipped = result.tracks_skipped,
            albums_found = result.albums_found,
            singles_found = result.singles_found,
            degraded = result.is_degraded(),
            "Playlist reconciled"
        );

        result
    }

    async fn load_playlist(&self, playlist_id: &str) -> Result<Playlist> {
        self.playlists
            .find_by_id(playlist_id)
            .await
            .map_err(|e| SyncError::persist(EntityKind::Playlist, playlist_id, e))?
            .ok_or_else(|| SyncError::NotFound {
                playlist_id: playlist_id.to_string(),
            })
    }

    async fn fetch_remote(&self, playlist: &Playlist) -> Result<(CatalogPlaylist, Vec<CatalogTrack>)> {
        let catalog = self.catalogs.get(&playlist.service).ok_or_else(|| {
            SyncError::fetch(
                EntityKind::Playlist,
                &playlist.external_id,
                BridgeError::NotAvailable(format!(
                    "No catalog registered for service '{}'",
                    playlist.service
                )),
            )
        })?;

        catalog
            .download_playlist(&playlist.external_id)
            .await
            .map_err(|e| SyncError::fetch(EntityKind::Playlist, &playlist.external_id, e))
    }

    /// Process one track and log the reason if it was skipped
    async fn process_track(
        &self,
        playlist: &Playlist,
        mut track: CatalogTrack,
        now: DateTime<Utc>,
    ) -> TrackOutcome {
        match self.try_process_track(playlist, &mut track, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log_skipped(playlist, &track, &e);
                TrackOutcome::Skipped(e)
            }
        }
    }

    async fn try_process_track(
        &self,
        playlist: &Playlist,
        track: &mut CatalogTrack,
        now: DateTime<Utc>,
    ) -> Result<TrackOutcome> {
        track.validate().map_err(|message| SyncError::Validation {
            track_id: track.external_id.clone(),
            message,
        })?;

        if !track.master_data || !track.has_identity() {
            self.master_data.resolve(track).await?;
        }

        let known = self
            .tracks
            .find_by_playlist_and_external_id(&playlist.id, &track.external_id)
            .await
            .map_err(|e| SyncError::persist(EntityKind::Track, &track.external_id, e))?;
        if known.is_some() {
            return Ok(TrackOutcome::AlreadyKnown);
        }

        let artist = self
            .identity
            .resolve_artist(&track.artist_external_id, now.timestamp())
            .await?;
        let artist = match self
            .identity
            .refresh_artist_name(artist.clone(), &track.artist_name, now.timestamp())
            .await
        {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(artist_id = %artist.id, error = %e, "Failed to refresh artist name");
                artist
            }
        };

        let (mut album, created) = self
            .identity
            .resolve_album(&track.album_external_id, &artist.id, now.timestamp())
            .await?;
        album.artist_id = artist.id.clone();

        let release = if created && self.classifier.is_new_release(album.released_at(), now) {
            self.record_release(playlist, &album, now).await
        } else {
            None
        };

        let mut stored = Track::new(
            playlist.id.clone(),
            track.external_id.clone(),
            track.name.clone(),
            artist.id,
            album.id,
        );
        stored.created_at = now.timestamp();

        self.tracks
            .insert(&stored)
            .await
            .map_err(|e| SyncError::persist(EntityKind::Track, &track.external_id, e))?;

        debug!(track_id = %track.external_id, local_id = %stored.id, "Track added");

        Ok(TrackOutcome::Added { release })
    }

    /// Best effort; a failed insert is logged and not retried on later runs
    async fn record_release(
        &self,
        playlist: &Playlist,
        album: &Album,
        now: DateTime<Utc>,
    ) -> Option<AlbumType> {
        let release = Release::new(album.id.clone(), playlist.id.clone(), now.timestamp());

        match self.releases.insert(&release).await {
            Ok(()) => {
                info!(
                    album_id = %album.external_id,
                    album = %album.name,
                    album_type = %album.album_type,
                    "New release recorded"
                );
                Some(album.kind())
            }
            Err(e) => {
                error!(
                    album_id = %album.external_id,
                    error = %e,
                    "Failed to store release"
                );
                None
            }
        }
    }

    async fn finalize(
        &self,
        playlist: &mut Playlist,
        remote: Option<&CatalogPlaylist>,
        changed: bool,
        now: DateTime<Utc>,
    ) {
        if let Some(remote) = remote {
            playlist.name = remote.name.clone();
            playlist.description = remote.description.clone();
        }
        if changed {
            playlist.last_changed = Some(now.timestamp());
        }
        playlist.updated_at = now.timestamp();

        if let Err(e) = self.playlists.update(playlist).await {
            error!(error = %e, "Failed to update playlist");
        }
    }
}

fn log_skipped(playlist: &Playlist, track: &CatalogTrack, err: &SyncError) {
    let playlist_id = playlist.id.as_str();
    let track_id = track.external_id.as_str();
    let artist_id = track.artist_external_id.as_str();
    let album_id = track.album_external_id.as_str();

    match err.kind() {
        ErrorKind::Validation => {
            warn!(playlist_id, track_id, error = %err, "Skipping invalid track");
        }
        ErrorKind::Resolution => {
            warn!(
                playlist_id,
                track_id,
                artist = %track.artist_name,
                album = %track.album_name,
                error = %err,
                "Skipping track without master data"
            );
        }
        ErrorKind::Fetch => {
            error!(
                playlist_id,
                track_id,
                artist_id,
                album_id,
                error = %err,
                "Catalog lookup failed, skipping track"
            );
        }
        ErrorKind::Persist | ErrorKind::NotFound => {
            error!(
                playlist_id,
                track_id,
                artist_id,
                album_id,
                error = %err,
                "Storage failed, skipping track"
            );
        }
    }
}
