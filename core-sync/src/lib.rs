//! # Playlist Reconciliation
//!
//! Reconciles a playlist's remote track listing against the local history
//! of artists, albums, releases and tracks.
//!
//! ## Components
//!
//! - **Master Data Resolver** (`master_data`): Canonical artist/album identity for
//!   tracks from catalogs other than the master catalog
//! - **Identity Resolver** (`identity`): Get-or-create for artists and albums keyed
//!   by master catalog id
//! - **Release Classifier** (`release`): Configurable new-release window
//! - **Reconciliation Engine** (`engine`): Per-playlist run producing a
//!   `DownloadResult`
//! - **Errors** (`error`): `SyncError` with a tagged `ErrorKind`

pub mod engine;
pub mod error;
pub mod identity;
pub mod master_data;
pub mod release;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{DownloadResult, PlaylistDownloader, Repositories, RunTally, TrackOutcome};
pub use error::{EntityKind, ErrorKind, Result, SyncError};
pub use identity::IdentityResolver;
pub use master_data::MasterDataResolver;
pub use release::ReleaseClassifier;
