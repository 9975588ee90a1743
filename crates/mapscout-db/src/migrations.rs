//! Embedded schema for the `users` and `search_history` tables.

use crate::error::{DatabaseError, Result};
use sqlx::SqlitePool;

/// Bring the schema up to date. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    migrator
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    tracing::debug!(applied = migrator.iter().count(), "User store schema ready");
    Ok(())
}

/// How many embedded migrations have been applied; 0 before the first run.
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i64> {
    let tracked: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_optional(pool)
    .await?;

    match tracked {
        None => Ok(0),
        Some(_) => Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(pool)
                .await?,
        ),
    }
}
