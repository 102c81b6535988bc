//! Schema migrations, compiled into the binary from `migrations/sqlite/`.
//!
//! sqlx records each applied file in `_sqlx_migrations` and refuses to start
//! if an applied file was edited afterwards, so schema changes always go in
//! a new `NNN_description.sql` file.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a database is behind the embedded migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies whatever is pending and re-checks what was applied before.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;

    MIGRATOR.run(pool).await?;

    if before.is_current() {
        debug!(applied = before.applied, "Schema is current");
    } else {
        info!(
            pending = before.embedded - before.applied,
            total = before.embedded,
            "Applied migrations"
        );
    }
    Ok(())
}

/// A fresh database without the bookkeeping table counts as zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let has_table: i64 = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    let applied: i64 = if has_table != 0 {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?
    } else {
        0
    };

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}
