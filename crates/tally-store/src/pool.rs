//! # Database Pool Management
//!
//! SQLite connection pool creation and configuration.
//!
//! WAL journal mode is enabled so the cashier-facing reads never block
//! on a settlement write, and foreign keys are switched on (SQLite ships
//! with them off).

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::snapshot::CartSnapshotRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file. Created if missing.
    pub database_path: PathBuf,

    /// Maximum pool size. A single POS terminal needs very few.
    pub max_connections: u32,

    /// How long to wait for a connection before giving up.
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration pointing at the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// In-memory database for tests.
    ///
    /// Capped at one connection: every in-memory connection is its own
    /// database, so a second connection would see empty tables.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone; all clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if necessary) the database and runs migrations.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The raw pool, for queries not covered by a repository.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Catalog item repository.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Cart snapshot repository.
    pub fn cart_snapshots(&self) -> CartSnapshotRepository {
        CartSnapshotRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("closing database connection pool");
        self.pool.close().await;
    }

    /// Whether the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_database_is_healthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // Second run applies nothing and must not fail
        db.run_migrations().await.unwrap();
    }

    #[test]
    fn config_builder() {
        let config = DbConfig::new("/tmp/tally.db")
            .max_connections(8)
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert!(!config.run_migrations);
    }
}
