//! # Database Handle
//!
//! Opening the SQLite pool the till and the record store share.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DbConfig::file(path) / DbConfig::in_memory()                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config) ── open pool ── apply migrations                 │
//! │       │                                                                 │
//! │       ├── db.catalog()       CatalogRepository      (reads, seeding)    │
//! │       ├── db.bills()         BillRepository         (reads)             │
//! │       └── db.record_store()  SqliteRecordStore      (checkout writes)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## SQLite Settings
//! - File databases run in WAL mode with `synchronous = NORMAL`, so bill
//!   lookups keep working while a checkout transaction is open.
//! - `foreign_keys` is switched on for every connection; `bill_items`
//!   relies on it.
//! - A busy timeout makes a second writer wait for the lock instead of
//!   failing at once with "database is locked".

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::bill::BillRepository;
use crate::repository::catalog::CatalogRepository;
use crate::store::SqliteRecordStore;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A file, created on first open.
    File(PathBuf),
    /// A private in-memory database that lives as long as the pool.
    Memory,
}

/// How to open the database.
///
/// ```rust
/// use std::time::Duration;
/// use tally_db::DbConfig;
///
/// let config = DbConfig::file("/var/lib/tally/till.db")
///     .with_max_connections(8)
///     .with_busy_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_connections, 8);
/// assert!(!config.is_in_memory());
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Pool size. Always 1 for in-memory databases.
    pub max_connections: u32,

    /// How long to wait for a free pooled connection.
    pub acquire_timeout: Duration,

    /// How long a connection waits on a locked database.
    pub busy_timeout: Duration,

    /// Apply pending migrations when opening.
    pub migrate: bool,
}

impl DbConfig {
    /// A file database with till-sized defaults (4 connections, 5s waits).
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// A throwaway database for tests and demos.
    ///
    /// Every SQLite connection to `:memory:` gets its own empty database,
    /// so the pool is pinned to one connection that is never recycled.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            ..DbConfig::file(PathBuf::new())
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        if !self.is_in_memory() {
            self.max_connections = max.max(1);
        }
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens without touching the schema.
    pub fn without_migrations(mut self) -> Self {
        self.migrate = false;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == DbLocation::Memory
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            DbLocation::Memory => SqliteConnectOptions::new().in_memory(true),
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
        };

        options.foreign_keys(true).busy_timeout(self.busy_timeout)
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout);

        match self.location {
            // Dropping the last connection would drop the data with it
            DbLocation::Memory => options.min_connections(1).idle_timeout(None).max_lifetime(None),
            DbLocation::File(_) => options.min_connections(1),
        }
    }
}

/// Shared handle to the till database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match &config.location {
            DbLocation::File(path) => info!(path = %path.display(), "Opening database"),
            DbLocation::Memory => info!("Opening in-memory database"),
        }

        let pool = config
            .pool_options()
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub fn bills(&self) -> BillRepository {
        BillRepository::new(self.pool.clone())
    }

    /// Record store for [`tally_checkout::CheckoutCommitter`].
    pub fn record_store(&self) -> SqliteRecordStore {
        SqliteRecordStore::new(self.pool.clone())
    }

    /// Closes every connection; later queries fail with `Unavailable`.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
