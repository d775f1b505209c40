//! Blast report storage
//!
//! Reports are keyed by (project, hole, depth). Writes replace on conflict;
//! deletes hand back the removed row so callers can echo it.

use sqlx::SqlitePool;
use tracing::info;

use super::models::{BlastReport, MAX_REPORT_LEN};
use crate::{Error, Result};

fn validate(report: &BlastReport) -> Result<()> {
    if report.hole_id.trim().is_empty() {
        return Err(Error::InvalidInput("holeID must not be empty".to_string()));
    }
    if !report.depth.is_finite() {
        return Err(Error::InvalidInput("depth must be a finite number".to_string()));
    }
    if report.report.chars().count() > MAX_REPORT_LEN {
        return Err(Error::InvalidInput(format!(
            "report exceeds {} characters",
            MAX_REPORT_LEN
        )));
    }
    Ok(())
}

/// Insert or fully replace a report
pub async fn upsert_report(pool: &SqlitePool, report: &BlastReport) -> Result<()> {
    validate(report)?;

    sqlx::query(
        r#"
        INSERT INTO blast_reports (project_id, hole_id, depth, report, score, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT (project_id, hole_id, depth) DO UPDATE SET
            report = excluded.report,
            score = excluded.score,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&report.project_id)
    .bind(&report.hole_id)
    .bind(report.depth)
    .bind(&report.report)
    .bind(report.score)
    .execute(pool)
    .await?;

    info!(
        "Stored blast report {}/{} @ {} m",
        report.project_id, report.hole_id, report.depth
    );
    Ok(())
}

pub async fn get_report(
    pool: &SqlitePool,
    project_id: &str,
    hole_id: &str,
    depth: f64,
) -> Result<Option<BlastReport>> {
    let report = sqlx::query_as::<_, BlastReport>(
        r#"
        SELECT project_id, hole_id, depth, report, score
        FROM blast_reports
        WHERE project_id = ? AND hole_id = ? AND depth = ?
        "#,
    )
    .bind(project_id)
    .bind(hole_id)
    .bind(depth)
    .fetch_optional(pool)
    .await?;

    Ok(report)
}

/// Reports of one hole ordered by depth
pub async fn list_hole_reports(
    pool: &SqlitePool,
    project_id: &str,
    hole_id: &str,
) -> Result<Vec<BlastReport>> {
    let reports = sqlx::query_as::<_, BlastReport>(
        r#"
        SELECT project_id, hole_id, depth, report, score
        FROM blast_reports
        WHERE project_id = ? AND hole_id = ?
        ORDER BY depth ASC
        "#,
    )
    .bind(project_id)
    .bind(hole_id)
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// Delete a report, returning it; `NotFound` if no such key exists
pub async fn delete_report(
    pool: &SqlitePool,
    project_id: &str,
    hole_id: &str,
    depth: f64,
) -> Result<BlastReport> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, BlastReport>(
        r#"
        SELECT project_id, hole_id, depth, report, score
        FROM blast_reports
        WHERE project_id = ? AND hole_id = ? AND depth = ?
        "#,
    )
    .bind(project_id)
    .bind(hole_id)
    .bind(depth)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        Error::NotFound(format!(
            "blast report {}/{} at depth {}",
            project_id, hole_id, depth
        ))
    })?;

    sqlx::query("DELETE FROM blast_reports WHERE project_id = ? AND hole_id = ? AND depth = ?")
        .bind(project_id)
        .bind(hole_id)
        .bind(depth)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Deleted blast report {}/{} @ {} m", project_id, hole_id, depth);
    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::create_schema(&pool).await.unwrap();
        pool
    }

    fn report(hole: &str, depth: f64, text: &str, score: i64) -> BlastReport {
        BlastReport {
            project_id: "site".to_string(),
            hole_id: hole.to_string(),
            depth,
            report: text.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let pool = setup_test_db().await;
        upsert_report(&pool, &report("H1", 4.5, "good fragmentation", 8)).await.unwrap();
        upsert_report(&pool, &report("H1", 4.5, "flyrock observed", 3)).await.unwrap();

        let stored = get_report(&pool, "site", "H1", 4.5).await.unwrap().unwrap();
        assert_eq!(stored.report, "flyrock observed");
        assert_eq!(stored.score, 3);
        assert_eq!(list_hole_reports(&pool, "site", "H1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_depth_is_part_of_key() {
        let pool = setup_test_db().await;
        upsert_report(&pool, &report("H1", 6.0, "deep", 5)).await.unwrap();
        upsert_report(&pool, &report("H1", 2.0, "shallow", 7)).await.unwrap();

        let listed = list_hole_reports(&pool, "site", "H1").await.unwrap();
        let depths: Vec<f64> = listed.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![2.0, 6.0]);
    }

    #[tokio::test]
    async fn test_delete_returns_row_then_not_found() {
        let pool = setup_test_db().await;
        upsert_report(&pool, &report("H1", 1.0, "ok", 5)).await.unwrap();

        let removed = delete_report(&pool, "site", "H1", 1.0).await.unwrap();
        assert_eq!(removed.report, "ok");
        assert!(get_report(&pool, "site", "H1", 1.0).await.unwrap().is_none());

        let again = delete_report(&pool, "site", "H1", 1.0).await;
        assert!(matches!(again, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_overlong_report_rejected() {
        let pool = setup_test_db().await;
        let long = "x".repeat(MAX_REPORT_LEN + 1);
        let result = upsert_report(&pool, &report("H1", 1.0, &long, 5)).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
