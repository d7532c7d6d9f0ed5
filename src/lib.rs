//! Workspace placeholder crate.
//!
//! This crate exists to expose a single dependency for host applications that
//! want the whole playlist reconciliation stack. Enabling `desktop-shims`
//! pulls in `core-service` together with the reqwest-backed HTTP bridge and
//! the Spotify catalog provider.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
