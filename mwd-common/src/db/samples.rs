//! MWD sample storage
//!
//! Samples are stored per project and always read back in acquisition order
//! (`sample_index`), which is the row order the clustering pipeline relies on.

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::{MwdSample, NewSample};
use crate::Result;

const SELECT_SAMPLES: &str = r#"
    SELECT project_id, sample_index, hole_id, depth,
           penetr_rate, perc_pressure, feed_pressure, rot_pressure, inst_rot_pressure,
           time
    FROM mwd_samples
"#;

/// Replace every sample of `project_id` with `samples`
///
/// Runs in one transaction: readers see either the old or the new set.
/// `sample_index` is assigned from the slice order.
pub async fn replace_project_samples(
    pool: &SqlitePool,
    project_id: &str,
    samples: &[NewSample],
) -> Result<u64> {
    for sample in samples {
        sample.validate()?;
    }

    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM mwd_samples WHERE project_id = ?")
        .bind(project_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for (index, sample) in samples.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO mwd_samples (
                project_id, sample_index, hole_id, depth,
                penetr_rate, perc_pressure, feed_pressure, rot_pressure, inst_rot_pressure,
                time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(index as i64)
        .bind(&sample.hole_id)
        .bind(sample.depth)
        .bind(sample.penetr_rate)
        .bind(sample.perc_pressure)
        .bind(sample.feed_pressure)
        .bind(sample.rot_pressure)
        .bind(sample.inst_rot_pressure)
        .bind(&sample.time)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Replaced samples for project {}: {} removed, {} inserted",
        project_id,
        removed,
        samples.len()
    );

    Ok(samples.len() as u64)
}

/// All samples of a project in acquisition order
pub async fn load_project_samples(pool: &SqlitePool, project_id: &str) -> Result<Vec<MwdSample>> {
    let sql = format!("{SELECT_SAMPLES} WHERE project_id = ? ORDER BY sample_index ASC");
    let samples = sqlx::query_as::<_, MwdSample>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await?;

    debug!("Loaded {} samples for project {}", samples.len(), project_id);
    Ok(samples)
}

/// Samples of one hole in acquisition order
pub async fn load_hole_samples(
    pool: &SqlitePool,
    project_id: &str,
    hole_id: &str,
) -> Result<Vec<MwdSample>> {
    let sql = format!(
        "{SELECT_SAMPLES} WHERE project_id = ? AND hole_id = ? ORDER BY sample_index ASC"
    );
    let samples = sqlx::query_as::<_, MwdSample>(&sql)
        .bind(project_id)
        .bind(hole_id)
        .fetch_all(pool)
        .await?;

    Ok(samples)
}

/// Distinct hole identifiers of a project, sorted
pub async fn list_hole_ids(pool: &SqlitePool, project_id: &str) -> Result<Vec<String>> {
    let holes = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT hole_id FROM mwd_samples WHERE project_id = ? ORDER BY hole_id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    Ok(holes)
}
