//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date.
//! Every statement is idempotent, so calling this on an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Open (creating if needed) the database at `db_path` and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets report writes proceed while clustering requests read samples
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes on an already-open pool
///
/// Used directly by tests running against `sqlite::memory:`.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_schema_version_table(pool).await?;
    create_samples_table(pool).await?;
    create_hole_positions_table(pool).await?;
    create_blast_reports_table(pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_samples_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mwd_samples (
            project_id TEXT NOT NULL,
            sample_index INTEGER NOT NULL,
            hole_id TEXT NOT NULL,
            depth REAL NOT NULL,
            penetr_rate REAL NOT NULL,
            perc_pressure REAL NOT NULL,
            feed_pressure REAL NOT NULL,
            rot_pressure REAL NOT NULL,
            inst_rot_pressure REAL NOT NULL,
            time TEXT,
            PRIMARY KEY (project_id, sample_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_mwd_samples_hole ON mwd_samples(project_id, hole_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_hole_positions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hole_positions (
            project_id TEXT NOT NULL,
            hole_id TEXT NOT NULL,
            easting REAL NOT NULL,
            northing REAL NOT NULL,
            elevation REAL,
            PRIMARY KEY (project_id, hole_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_blast_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blast_reports (
            project_id TEXT NOT NULL,
            hole_id TEXT NOT NULL,
            depth REAL NOT NULL,
            report TEXT NOT NULL,
            score INTEGER NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (project_id, hole_id, depth)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
