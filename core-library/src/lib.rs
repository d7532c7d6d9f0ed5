//! # Library Management Module
//!
//! Owns the playlist history database and provides repository patterns for
//! data access.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite database schema and migrations
//! - Domain models for playlists, artists, albums, releases and tracks
//! - Repositories with the lookups the reconciliation engine relies on,
//!   including the `(playlist, external track id)` dedup check

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use models::{Album, AlbumType, Artist, Playlist, Release, Track};
