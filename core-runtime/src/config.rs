//! Configuration for the reconciliation core
//!
//! A host assembles a [`CoreConfig`] through [`CoreConfig::builder`] once at
//! startup. `build()` checks everything it can without touching the network
//! or the disk, so a bad token or an out-of-range window is reported before
//! the first playlist is reconciled.
//!
//! Required: the database path and a catalog access token. The HTTP client
//! may be omitted when the `desktop-shims` feature supplies the reqwest one.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/playlist-sync/playlists.db")
//!     .catalog_access_token(std::env::var("SPOTIFY_TOKEN")?)
//!     .release_window_days(14)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::{redact_if_sensitive, LoggingConfig};
use bridge_traits::HttpClient;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_RELEASE_WINDOW_DAYS: u32 = 30;

/// Ten years
pub const MAX_RELEASE_WINDOW_DAYS: u32 = 3650;

pub const DEFAULT_CATALOG_API_BASE_URL: &str = "https://api.spotify.com/v1";

const MAX_CATALOG_ATTEMPTS: u32 = 10;

/// Validated settings and host capabilities for the core service
#[derive(Clone)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub http_client: Arc<dyn HttpClient>,
    pub catalog: CatalogConfig,
    /// Albums released at most this many days before a run are new releases
    pub release_window_days: u32,
    pub logging: LoggingConfig,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("http_client", &"dyn HttpClient")
            .field("catalog", &self.catalog)
            .field("release_window_days", &self.release_window_days)
            .field("logging", &self.logging)
            .finish()
    }
}

/// Remote catalog endpoint and credentials
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// No trailing slash
    pub api_base_url: String,
    /// Bearer token sent with every request
    pub access_token: String,
    /// Attempts per request, the first included, when the API answers 429 or 5xx
    pub max_retries: u32,
}

impl CatalogConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_CATALOG_API_BASE_URL.to_string(),
            access_token: access_token.into(),
            max_retries: 3,
        }
    }

    /// Proxy or test server in place of the public API
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(Error::Config("Catalog access token is blank".to_string()));
        }

        let scheme_ok = ["http://", "https://"]
            .iter()
            .any(|scheme| self.api_base_url.starts_with(scheme));
        if !scheme_ok {
            return Err(Error::Config(format!(
                "Catalog API base URL must be http(s), got '{}'",
                self.api_base_url
            )));
        }

        if !(1..=MAX_CATALOG_ATTEMPTS).contains(&self.max_retries) {
            return Err(Error::Config(format!(
                "Catalog max retries must be within 1..={}, got {}",
                MAX_CATALOG_ATTEMPTS, self.max_retries
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "access_token",
                &redact_if_sensitive("access_token", &self.access_token),
            )
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Range checks, also run by [`CoreConfigBuilder::build`]
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path is empty".to_string()));
        }

        if !(1..=MAX_RELEASE_WINDOW_DAYS).contains(&self.release_window_days) {
            return Err(Error::Config(format!(
                "Release window must be within 1..={} days, got {}",
                MAX_RELEASE_WINDOW_DAYS, self.release_window_days
            )));
        }

        self.catalog.validate()
    }
}

#[cfg(feature = "desktop-shims")]
fn default_http_client() -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create reqwest client: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HttpClient was injected. Pass one to .http_client(), \
                  or enable the 'desktop-shims' feature for the reqwest client."
            .to_string(),
    })
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    catalog: Option<CatalogConfig>,
    access_token: Option<String>,
    release_window_days: Option<u32>,
    logging: Option<LoggingConfig>,
}

impl CoreConfigBuilder {
    /// SQLite file, created on first use
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().database_path("playlists.db");
    /// ```
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Token for a default [`CatalogConfig`]; ignored when [`catalog`](Self::catalog) is set
    pub fn catalog_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Defaults to [`DEFAULT_RELEASE_WINDOW_DAYS`]
    pub fn release_window_days(mut self, days: u32) -> Self {
        self.release_window_days = Some(days);
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// # Errors
    ///
    /// - [`Error::Config`] for a missing path or token, or an out-of-range value
    /// - [`Error::CapabilityMissing`] when no HTTP client is available
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required, set it with .database_path()".to_string())
        })?;

        let catalog = match (self.catalog, self.access_token) {
            (Some(catalog), _) => catalog,
            (None, Some(token)) => CatalogConfig::new(token),
            (None, None) => {
                return Err(Error::Config(
                    "Catalog access token is required, set it with .catalog_access_token()"
                        .to_string(),
                ))
            }
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => default_http_client()?,
        };

        let config = CoreConfig {
            database_path,
            http_client,
            catalog,
            release_window_days: self
                .release_window_days
                .unwrap_or(DEFAULT_RELEASE_WINDOW_DAYS),
            logging: self.logging.unwrap_or_default(),
        };
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse};

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .database_path("/tmp/playlists.db")
            .catalog_access_token("token")
            .http_client(Arc::new(MockHttpClient))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = builder().build().unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/playlists.db"));
        assert_eq!(config.release_window_days, DEFAULT_RELEASE_WINDOW_DAYS);
        assert_eq!(config.catalog.api_base_url, DEFAULT_CATALOG_API_BASE_URL);
        assert_eq!(config.catalog.max_retries, 3);
    }

    #[test]
    fn test_builder_requires_database_path() {
        let result = CoreConfig::builder()
            .catalog_access_token("token")
            .http_client(Arc::new(MockHttpClient))
            .build();

        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("Database path is required")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_requires_access_token() {
        let result = CoreConfig::builder()
            .database_path("/tmp/playlists.db")
            .http_client(Arc::new(MockHttpClient))
            .build();

        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("access token is required")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client() {
        let result = CoreConfig::builder()
            .database_path("/tmp/playlists.db")
            .catalog_access_token("token")
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient")
            }
            other => panic!("expected missing capability, got {:?}", other),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_http_client() {
        let config = CoreConfig::builder()
            .database_path("/tmp/playlists.db")
            .catalog_access_token("token")
            .build();

        assert!(config.is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_release_window() {
        let result = builder().release_window_days(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_release_window() {
        let result = builder()
            .release_window_days(MAX_RELEASE_WINDOW_DAYS + 1)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));

        let config = builder()
            .release_window_days(MAX_RELEASE_WINDOW_DAYS)
            .build()
            .unwrap();
        assert_eq!(config.release_window_days, MAX_RELEASE_WINDOW_DAYS);
    }

    #[test]
    fn test_validate_rejects_blank_token() {
        let result = builder().catalog(CatalogConfig::new("   ")).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_catalog_config_overrides_token_shorthand() {
        let config = builder()
            .catalog(
                CatalogConfig::new("explicit")
                    .with_api_base_url("http://localhost:8080/v1/")
                    .with_max_retries(5),
            )
            .build()
            .unwrap();

        assert_eq!(config.catalog.access_token, "explicit");
        assert_eq!(config.catalog.api_base_url, "http://localhost:8080/v1");
        assert_eq!(config.catalog.max_retries, 5);
    }

    #[test]
    fn test_catalog_config_rejects_bad_url() {
        let catalog = CatalogConfig::new("token").with_api_base_url("ftp://catalog");
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_catalog_config_rejects_retry_bounds() {
        assert!(CatalogConfig::new("token").with_max_retries(0).validate().is_err());
        assert!(CatalogConfig::new("token").with_max_retries(11).validate().is_err());
        assert!(CatalogConfig::new("token").with_max_retries(10).validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = builder().build().unwrap();
        let rendered = format!("{:?}", config);

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("\"token\""));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(config.database_path, cloned.database_path);
        assert_eq!(config.catalog, cloned.catalog);
    }
}
