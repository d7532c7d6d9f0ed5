//! SQLite pool for the playlist history store
//!
//! The pool runs in WAL mode with foreign keys on, and applies the embedded
//! migrations before it is handed out. Reconciliation runs for different
//! playlists may write concurrently; `busy_timeout` makes a blocked writer
//! wait instead of failing with `SQLITE_BUSY`.
//!
//! ```rust,ignore
//! use core_library::db::{create_pool, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new("playlists.db")).await?;
//! ```

use crate::{LibraryError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    /// Private to the pool and dropped with it
    InMemory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub location: DatabaseLocation,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(database_path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Single-connection in-memory database
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the
    /// pool is pinned to one connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        if self.location != DatabaseLocation::InMemory {
            self.max_connections = max.max(1);
        }
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            DatabaseLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            DatabaseLocation::InMemory => SqliteConnectOptions::new()
                .in_memory(true)
                .journal_mode(SqliteJournalMode::Memory),
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
    }
}

/// Open the pool, migrate the schema and check the connection
///
/// # Errors
///
/// Returns [`LibraryError::Database`] if the file cannot be opened or the
/// health check fails, and [`LibraryError::Migration`] if a migration fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<Pool<Sqlite>> {
    info!(
        location = ?config.location,
        max_connections = config.max_connections,
        "Opening database"
    );

    let mut options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout);
    if config.location == DatabaseLocation::InMemory {
        options = options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options
        .connect_with(config.connect_options())
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to open database");
            LibraryError::Database(e)
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        LibraryError::Migration(e.to_string())
    })?;

    health_check(&pool).await?;

    info!("Database ready");
    Ok(pool)
}

/// In-memory pool with the schema applied
pub async fn create_test_pool() -> Result<Pool<Sqlite>> {
    create_pool(DatabaseConfig::in_memory()).await
}

async fn health_check(pool: &Pool<Sqlite>) -> Result<()> {
    let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(pool)
        .await?;

    if foreign_keys != 1 {
        warn!("Foreign key enforcement is off");
        return Err(LibraryError::InvalidInput {
            field: "foreign_keys".to_string(),
            message: "SQLite foreign key enforcement is disabled".to_string(),
        });
    }

    debug!("Database health check passed");
    Ok(())
}
