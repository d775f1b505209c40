//! Hole collar positions, used by the hole-location map

use sqlx::SqlitePool;
use tracing::info;

use super::models::HolePosition;
use crate::{Error, Result};

/// Replace all hole positions of a project in one transaction
pub async fn replace_project_positions(
    pool: &SqlitePool,
    project_id: &str,
    positions: &[HolePosition],
) -> Result<u64> {
    for position in positions {
        if position.hole_id.trim().is_empty() {
            return Err(Error::InvalidInput("holeID must not be empty".to_string()));
        }
        if !(position.easting.is_finite() && position.northing.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "non-finite coordinates for hole {}",
                position.hole_id
            )));
        }
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM hole_positions WHERE project_id = ?")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    // INSERT OR REPLACE: a repeated holeID in the payload keeps the last entry
    for position in positions {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO hole_positions (project_id, hole_id, easting, northing, elevation)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(&position.hole_id)
        .bind(position.easting)
        .bind(position.northing)
        .bind(position.elevation)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("Stored {} hole positions for project {}", positions.len(), project_id);
    Ok(positions.len() as u64)
}

/// Hole positions of a project ordered by hole id
pub async fn load_project_positions(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<HolePosition>> {
    let positions = sqlx::query_as::<_, HolePosition>(
        r#"
        SELECT hole_id, easting, northing, elevation
        FROM hole_positions
        WHERE project_id = ?
        ORDER BY hole_id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    Ok(positions)
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

    fn position(hole: &str, easting: f64, northing: f64) -> HolePosition {
        HolePosition {
            hole_id: hole.to_string(),
            easting,
            northing,
            elevation: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_hole_keeps_last() {
        let pool = setup_test_db().await;
        replace_project_positions(
            &pool,
            "site",
            &[position("H2", 5.0, 5.0), position("H1", 0.0, 0.0), position("H2", 7.0, 8.0)],
        )
        .await
        .unwrap();

        let loaded = load_project_positions(&pool, "site").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].hole_id, "H1");
        assert_eq!(loaded[1].easting, 7.0);
    }

    #[tokio::test]
    async fn test_rejects_nan_coordinates() {
        let pool = setup_test_db().await;
        let result = replace_project_positions(&pool, "site", &[position("H1", f64::NAN, 0.0)]).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
