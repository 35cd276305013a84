//! # Database Migrations
//!
//! Embedded SQL migrations for the storage layer.
//!
//! Migrations live in `migrations/sqlite/` at the workspace root and are
//! compiled into the binary by `sqlx::migrate!`; nothing is read from
//! disk at runtime. New migrations get the next sequence number; applied
//! files are never edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Migrations embedded at compile time from `migrations/sqlite`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations in order. Idempotent: applied migrations
/// are tracked in `_sqlx_migrations` and skipped on the next run.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("all migrations applied");
    Ok(())
}

/// Returns (total, applied) migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn status_reports_applied_migrations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert!(total >= 1);
        assert_eq!(total, applied);
    }
}
