//! Persistence for quests and local accounts.
//!
//! One SQLite file under the app data directory. [`create_pool`] migrates it
//! and hands back the pool the [`Repository`] runs on.

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::{run_migrations, schema_version};

use crate::config::{DATABASE_BUSY_TIMEOUT_SECS, DATABASE_MAX_CONNECTIONS};
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

fn file_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(DATABASE_BUSY_TIMEOUT_SECS))
}

/// Open the quest database at `db_path`, creating and migrating it as needed.
///
/// The schema is migrated over a single connection that is closed before the
/// shared pool opens, so every pooled connection sees the final schema.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let migrator = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(file_options(db_path))
        .await?;
    let applied = run_migrations(&migrator).await?;
    migrator.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .connect_with(file_options(db_path))
        .await?;

    tracing::info!(
        "Opened database {:?} ({} migrations applied)",
        db_path,
        applied
    );
    Ok(pool)
}

/// Migrated in-memory database on one connection.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();
    pool
}
