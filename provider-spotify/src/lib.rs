//! # Spotify Provider
//!
//! Implements `CatalogService` for the Spotify Web API v1.
//!
//! ## Overview
//!
//! This module provides:
//! - Playlist download with pagination over the playlist tracks endpoint
//! - Artist and album lookups by Spotify id
//! - Album search by artist and album name for tracks without master data
//! - Rate limiting and exponential backoff
//!
//! Spotify doubles as the master catalog: the identity of every artist and
//! album stored locally is a Spotify id.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{SpotifyConnector, SERVICE_NAME, SPOTIFY_API_BASE};
pub use error::{Result, SpotifyError};
