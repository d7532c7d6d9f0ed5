//! # Host Bridge Traits
//!
//! Capability traits that the reconciliation core requires from its host.
//!
//! ## Overview
//!
//! This crate defines the contract between the core and the outside world.
//! Each trait represents a capability the core consumes but never implements
//! itself: talking HTTP, reading the clock, and querying a remote music
//! catalog.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - GET requests against remote catalogs
//!
//! ### Remote catalog
//! - [`CatalogService`](catalog::CatalogService) - Playlist, artist and album lookups
//!   against a remote music catalog
//! - [`CatalogRegistry`](catalog::CatalogRegistry) - Service-name lookup for the catalog
//!   that owns a given playlist
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LogLevel`](time::LogLevel) - Shared log level used by logging configuration
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Implementations
//! should convert transport or API specific errors into it and keep the message
//! actionable (status codes, identifiers).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared across
//! async tasks behind an `Arc`.
//!
//! ## Examples
//!
//! ### Implementing CatalogService
//!
//! ```ignore
//! use bridge_traits::catalog::{CatalogService, CatalogPlaylist, CatalogTrack};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyCatalog;
//!
//! #[async_trait]
//! impl CatalogService for MyCatalog {
//!     fn service_name(&self) -> &str {
//!         "my-catalog"
//!     }
//!
//!     async fn download_playlist(
//!         &self,
//!         external_id: &str,
//!     ) -> Result<(CatalogPlaylist, Vec<CatalogTrack>)> {
//!         todo!()
//!     }
//!     // ...
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod http;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{
    CatalogAlbum, CatalogArtist, CatalogPlaylist, CatalogRegistry, CatalogService, CatalogTrack,
};
pub use http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
