//! Hole listing and bulk ingest of samples and collar positions

use axum::extract::State;
use axum::Json;
use mwd_common::db::models::NewSample;
use mwd_common::db::{positions, samples};
use mwd_common::HolePosition;
use serde::Serialize;
use tracing::info;

use super::extract::{ApiJson, ApiPath};
use super::ProjectPath;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HoleEntry {
    #[serde(rename = "holeID")]
    pub hole_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReplaceResponse {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub stored: u64,
}

/// GET /api/projects/:project_id/holes
pub async fn list_holes(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
) -> ApiResult<Json<Vec<HoleEntry>>> {
    let holes = samples::list_hole_ids(&state.db, &project_id)
        .await?
        .into_iter()
        .map(|hole_id| HoleEntry { hole_id })
        .collect();
    Ok(Json(holes))
}

/// PUT /api/projects/:project_id/samples
///
/// Replaces the project's samples; array order becomes acquisition order.
pub async fn replace_samples(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
    ApiJson(batch): ApiJson<Vec<NewSample>>,
) -> ApiResult<Json<ReplaceResponse>> {
    let stored = samples::replace_project_samples(&state.db, &project_id, &batch).await?;
    info!("Project {}: replaced samples ({} rows)", project_id, stored);
    Ok(Json(ReplaceResponse { project_id, stored }))
}

/// PUT /api/projects/:project_id/positions
pub async fn replace_positions(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
    ApiJson(batch): ApiJson<Vec<HolePosition>>,
) -> ApiResult<Json<ReplaceResponse>> {
    let stored = positions::replace_project_positions(&state.db, &project_id, &batch).await?;
    info!("Project {}: replaced hole positions ({} rows)", project_id, stored);
    Ok(Json(ReplaceResponse { project_id, stored }))
}
