//! Domain models for the playlist history store
//!
//! This module contains domain models with validation and database mapping.
//! Local identifiers are UUID v4 strings assigned at construction; external
//! identifiers are the ones handed out by the remote catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Album Type
// =============================================================================

/// Classification of an album, derived from the catalog's free-form type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumType {
    Album,
    Single,
    Other,
}

impl AlbumType {
    /// Parse a catalog album type; anything but `album`/`single` is `Other`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "album" => Self::Album,
            "single" => Self::Single,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Single => "single",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AlbumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Playlist tracked against a remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    /// Unique identifier
    pub id: String,
    /// Playlist identifier in the owning catalog
    pub external_id: String,
    /// Name of the owning catalog (e.g. `spotify`)
    pub service: String,
    /// Display name, refreshed from the catalog on every run
    pub name: String,
    /// Description, refreshed from the catalog on every run
    pub description: String,
    /// Last run that persisted at least one new track
    pub last_changed: Option<i64>,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl Playlist {
    /// Create a playlist to be reconciled against `service`
    pub fn new(external_id: String, service: String, name: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            external_id,
            service,
            name,
            description: String::new(),
            last_changed: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate playlist data
    ///
    /// The name may be empty until the first run copies it from the catalog.
    pub fn validate(&self) -> Result<(), String> {
        if self.external_id.trim().is_empty() {
            return Err("Playlist external id cannot be empty".to_string());
        }

        if self.service.trim().is_empty() {
            return Err("Playlist service cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Artist known to the master catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Artist {
    /// Unique identifier
    pub id: String,
    /// Master catalog identifier
    pub external_id: String,
    /// Artist name
    pub name: String,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl Artist {
    pub fn new(external_id: String, name: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            external_id,
            name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate artist data
    pub fn validate(&self) -> Result<(), String> {
        if self.external_id.trim().is_empty() {
            return Err("Artist external id cannot be empty".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Album known to the master catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Album {
    /// Unique identifier
    pub id: String,
    /// Master catalog identifier
    pub external_id: String,
    /// Owning artist reference
    pub artist_id: String,
    /// Album name
    pub name: String,
    /// Catalog album type as reported (`album`, `single`, `compilation`, ...)
    pub album_type: String,
    /// Release date as a Unix timestamp at UTC midnight
    pub release_date: Option<i64>,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl Album {
    pub fn new(
        external_id: String,
        artist_id: String,
        name: String,
        album_type: String,
        release_date: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            external_id,
            artist_id,
            name,
            album_type,
            release_date: release_date.map(Self::date_to_timestamp),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate album data
    pub fn validate(&self) -> Result<(), String> {
        if self.external_id.trim().is_empty() {
            return Err("Album external id cannot be empty".to_string());
        }

        if self.artist_id.trim().is_empty() {
            return Err("Album must reference an artist".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Album name cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn kind(&self) -> AlbumType {
        AlbumType::parse(&self.album_type)
    }

    /// Release date as a UTC instant
    pub fn released_at(&self) -> Option<DateTime<Utc>> {
        self.release_date
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    fn date_to_timestamp(date: NaiveDate) -> i64 {
        date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
    }
}

/// First observation of a newly released album in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Release {
    /// Unique identifier
    pub id: String,
    pub album_id: String,
    pub playlist_id: String,
    /// When the release was observed
    pub sync_date: i64,
}

impl Release {
    pub fn new(album_id: String, playlist_id: String, sync_date: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            album_id,
            playlist_id,
            sync_date,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.album_id.trim().is_empty() || self.playlist_id.trim().is_empty() {
            return Err("Release must reference an album and a playlist".to_string());
        }

        Ok(())
    }
}

/// Track recorded for a playlist
///
/// `(playlist_id, external_id)` is unique. Rows are written once and never
/// updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Track {
    /// Unique identifier
    pub id: String,
    pub playlist_id: String,
    /// Track identifier in the playlist's catalog
    pub external_id: String,
    /// Track title
    pub name: String,
    /// Resolved artist reference
    pub artist_id: String,
    /// Resolved album reference
    pub album_id: String,
    pub created_at: i64,
}

impl Track {
    pub fn new(
        playlist_id: String,
        external_id: String,
        name: String,
        artist_id: String,
        album_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            playlist_id,
            external_id,
            name,
            artist_id,
            album_id,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Validate track data
    pub fn validate(&self) -> Result<(), String> {
        if self.external_id.trim().is_empty() {
            return Err("Track external id cannot be empty".to_string());
        }

        if self.playlist_id.is_empty() || self.artist_id.is_empty() || self.album_id.is_empty() {
            return Err("Track must reference a playlist, an artist and an album".to_string());
        }

        Ok(())
    }
}
