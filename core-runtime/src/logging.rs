//! # Logging
//!
//! Components never hold a logger. They emit `tracing` events, and the
//! reconciliation engine opens a `reconcile` span per run so that every event
//! of that run carries its `playlist_id`. This module installs the global
//! subscriber that renders those events.
//!
//! Filtering, in order of precedence:
//! 1. [`LoggingConfig::filter`] when set
//! 2. `RUST_LOG` when [`LoggingConfig::respect_env`] is on and the variable is set
//! 3. the workspace crates at [`LoggingConfig::level`], chatty dependencies at `warn`
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use bridge_traits::time::LogLevel;
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Json)
//!         .with_level(LogLevel::Debug),
//! )?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::time::LogLevel;
use std::borrow::Cow;
use std::io;
use std::str::FromStr;
use tracing_subscriber::{
    filter::EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
    Layer, Registry,
};

const WORKSPACE_TARGETS: &[&str] = &[
    "playlist_sync_workspace",
    "bridge_desktop",
    "core_runtime",
    "core_library",
    "core_sync",
    "core_service",
    "provider_spotify",
];

const QUIET_DEPENDENCIES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "rustls", "sqlx"];

const SENSITIVE_FIELDS: &[&str] = &[
    "token",
    "authorization",
    "bearer",
    "secret",
    "password",
    "api_key",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    /// One JSON object per event, span fields flattened in
    Json,
    /// Single line per event
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(Error::Config(format!("Unknown log format: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Full `EnvFilter` directive string, e.g. `core_sync=debug,sqlx=warn`
    pub filter: Option<String>,
    pub respect_env: bool,
    /// Log span open/close (pretty) or the span list (JSON)
    pub span_events: bool,
    pub display_target: bool,
    pub display_thread: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            respect_env: true,
            span_events: false,
            display_target: true,
            display_thread: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Ignore `RUST_LOG` and always use the configured level or filter
    pub fn ignore_env(mut self) -> Self {
        self.respect_env = false;
        self
    }

    pub fn with_span_events(mut self, enable: bool) -> Self {
        self.span_events = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    /// Thread names and ids on every event
    pub fn with_thread(mut self, display: bool) -> Self {
        self.display_thread = display;
        self
    }
}

/// Install the global subscriber, writing to stderr
///
/// # Errors
///
/// [`Error::Config`] if the filter does not parse or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    tracing_subscriber::registry()
        .with(fmt_layer(&config))
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        format = ?config.format,
        level = config.level.as_str(),
        "Logging initialized"
    );
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Some(directives) = &config.filter {
        return EnvFilter::try_new(directives)
            .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)));
    }

    if config.respect_env {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }

    EnvFilter::try_new(default_directives(config.level))
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

fn default_directives(level: LogLevel) -> String {
    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level.as_str()))
        .chain(QUIET_DEPENDENCIES.iter().map(|dep| format!("{}=warn", dep)))
        .collect::<Vec<_>>()
        .join(",")
}

fn fmt_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(config.display_target)
        .with_thread_names(config.display_thread)
        .with_thread_ids(config.display_thread);

    match config.format {
        LogFormat::Pretty => base
            .pretty()
            .with_span_events(if config.span_events {
                FmtSpan::NEW | FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            })
            .boxed(),
        LogFormat::Json => base
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(config.span_events)
            .boxed(),
        LogFormat::Compact => base.compact().boxed(),
    }
}

/// `[REDACTED]` for credential-like field names, the value otherwise
///
/// ```
/// use core_runtime::logging::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("access_token", "BQD..."), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("playlist_id", "37i9dQ"), "37i9dQ");
/// ```
pub fn redact_if_sensitive<'a>(field_name: &str, value: &'a str) -> Cow<'a, str> {
    let field = field_name.to_ascii_lowercase();
    if SENSITIVE_FIELDS.iter().any(|marker| field.contains(marker)) {
        Cow::Borrowed("[REDACTED]")
    } else {
        Cow::Borrowed(value)
    }
}
