//! # Repositories
//!
//! One `async_trait` trait per table, each with a `Sqlite*` implementation
//! over a shared `SqlitePool`. The engine depends on the traits only, so
//! tests can swap in mocks.
//!
//! - `PlaylistRepository`: catalog playlists under reconciliation
//! - `ArtistRepository`, `AlbumRepository`: keyed by master catalog id
//! - `ReleaseRepository`: new-release observations, append-only
//! - `TrackRepository`: tracks per playlist, write-once, unique on the catalog id
//!
//! Entities are validated before they reach SQL. Constraint violations
//! surface as [`LibraryError::Database`](crate::LibraryError::Database) and
//! can be recognised with
//! [`LibraryError::is_unique_violation`](crate::LibraryError::is_unique_violation).

pub mod album;
pub mod artist;
pub mod pagination;
pub mod playlist;
pub mod release;
pub mod track;

pub use album::{AlbumRepository, SqliteAlbumRepository};
pub use artist::{ArtistRepository, SqliteArtistRepository};
pub use pagination::{Page, PageRequest, MAX_PAGE_SIZE};
pub use playlist::{PlaylistRepository, SqlitePlaylistRepository};
pub use release::{ReleaseRepository, SqliteReleaseRepository};
pub use track::{SqliteTrackRepository, TrackRepository};

use crate::error::{LibraryError, Result};
use sqlx::sqlite::SqliteQueryResult;

/// Turn a failed `validate()` into `InvalidInput` for `entity`
pub(crate) fn check_valid(entity: &str, validation: std::result::Result<(), String>) -> Result<()> {
    validation.map_err(|message| LibraryError::InvalidInput {
        field: entity.to_string(),
        message,
    })
}

/// An UPDATE that matched no row means the entity was never stored
pub(crate) fn expect_row(result: SqliteQueryResult, entity: &str, id: &str) -> Result<()> {
    match result.rows_affected() {
        0 => Err(LibraryError::NotFound {
            entity_type: entity.to_string(),
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}
