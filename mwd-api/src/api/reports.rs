//! Blast report endpoints

use axum::extract::State;
use axum::Json;
use mwd_common::db::reports;
use mwd_common::BlastReport;
use serde::Deserialize;

use super::extract::{ApiJson, ApiPath};
use super::HolePath;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportPath {
    pub project_id: String,
    pub hole_id: String,
    pub depth: f64,
}

/// POST body; project and hole come from the path
#[derive(Debug, Deserialize)]
pub struct ReportSubmission {
    pub depth: f64,
    pub report: String,
    pub score: i64,
}

/// GET /api/projects/:project_id/holes/:hole_id/reports
pub async fn list_reports(
    State(state): State<AppState>,
    ApiPath(HolePath { project_id, hole_id }): ApiPath<HolePath>,
) -> ApiResult<Json<Vec<BlastReport>>> {
    let found = reports::list_hole_reports(&state.db, &project_id, &hole_id).await?;
    Ok(Json(found))
}

/// POST /api/projects/:project_id/holes/:hole_id/reports
///
/// Creates the report or replaces the one stored at the same depth.
pub async fn submit_report(
    State(state): State<AppState>,
    ApiPath(HolePath { project_id, hole_id }): ApiPath<HolePath>,
    ApiJson(submission): ApiJson<ReportSubmission>,
) -> ApiResult<Json<BlastReport>> {
    let report = BlastReport {
        project_id,
        hole_id,
        depth: submission.depth,
        report: submission.report,
        score: submission.score,
    };
    reports::upsert_report(&state.db, &report).await?;
    Ok(Json(report))
}

/// GET /api/projects/:project_id/holes/:hole_id/reports/:depth
pub async fn get_report(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ReportPath>,
) -> ApiResult<Json<BlastReport>> {
    reports::get_report(&state.db, &path.project_id, &path.hole_id, path.depth)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No blast report for hole {} at depth {}",
                path.hole_id, path.depth
            ))
        })
}

/// DELETE /api/projects/:project_id/holes/:hole_id/reports/:depth
///
/// Responds with the deleted report.
pub async fn delete_report(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ReportPath>,
) -> ApiResult<Json<BlastReport>> {
    let removed = reports::delete_report(&state.db, &path.project_id, &path.hole_id, path.depth).await?;
    Ok(Json(removed))
}
