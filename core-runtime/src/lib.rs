//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playlist sync core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! Every other core crate depends on this one for its configuration types and
//! for the logging conventions used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CatalogConfig, CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
