//! Versioned schema migrations
//!
//! Each migration is a SQL script compiled into the binary. Scripts run once,
//! in version order, each inside its own transaction, and are recorded in
//! `schema_migrations`.

use crate::error::Result;
use sqlx::sqlite::SqlitePool;

/// A schema change shipped with the binary.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Every migration, oldest first.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: include_str!("migrations/001_initial_schema.sql"),
}];

/// Split a script into executable statements, dropping `--` comment lines.
fn statements(sql: &str) -> Vec<String> {
    let stripped: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    stripped
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Highest migration version recorded in `pool`, 0 for a fresh database.
pub async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// Bring the schema up to date. Returns how many migrations ran.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    let current = schema_version(pool).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        tracing::debug!("Schema up to date at version {}", current);
        return Ok(0);
    }

    for migration in &pending {
        tracing::info!(
            "Applying migration {:03}_{}",
            migration.version,
            migration.name
        );

        let mut tx = pool.begin().await?;
        for statement in statements(migration.sql) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    tracing::info!(
        "Schema migrated from version {} to {}",
        current,
        schema_version(pool).await?
    );
    Ok(pending.len())
}
