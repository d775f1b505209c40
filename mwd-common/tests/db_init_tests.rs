//! Integration tests for database initialization
//!
//! Covers first-run creation, reopening an existing file and the presence of
//! every table the service reads or writes.

use mwd_common::db::init::{init_database, SCHEMA_VERSION};
use mwd_common::db::models::NewSample;
use mwd_common::db::samples::{load_project_samples, replace_project_samples};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("mwd.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("mwd.db");

    let pool1 = init_database(&db_path).await.unwrap();
    let sample = NewSample {
        hole_id: "H1".to_string(),
        depth: 0.4,
        penetr_rate: 1.2,
        perc_pressure: 160.0,
        feed_pressure: 70.0,
        rot_pressure: 50.0,
        inst_rot_pressure: 51.0,
        time: None,
    };
    replace_project_samples(&pool1, "site", &[sample]).await.unwrap();
    pool1.close().await;

    // Second open must not drop or recreate tables
    let pool2 = init_database(&db_path).await.unwrap();
    let samples = load_project_samples(&pool2, "site").await.unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].hole_id, "H1");
}

#[tokio::test]
async fn test_all_tables_created() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("mwd.db")).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in ["blast_reports", "hole_positions", "mwd_samples", "schema_version"] {
        assert!(
            tables.iter().any(|t| t == expected),
            "Missing table {}; found {:?}",
            expected,
            tables
        );
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}
