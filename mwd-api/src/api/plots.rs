//! Chart endpoints: depth profiles, hardness bands and the hole map
//!
//! Charts are rendered on the blocking pool and returned base64-encoded.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use mwd_common::db::{positions, samples};
use mwd_common::{Feature, MwdSample};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::ApiPath;
use super::{run_blocking, HolePath, ProjectPath};
use crate::error::ApiResult;
use crate::pipeline::PipelineError;
use crate::render::{self, HardnessBand, HoleProfiles, CHART_MEDIA_TYPE};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeaturePath {
    pub project_id: String,
    pub hole_id: String,
    pub feature: String,
}

#[derive(Debug, Serialize)]
pub struct FeaturePlotResponse {
    #[serde(rename = "holeID")]
    pub hole_id: String,
    #[serde(rename = "Feature")]
    pub feature: Feature,
    #[serde(rename = "mediaType")]
    pub media_type: &'static str,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct HardnessResponse {
    #[serde(rename = "holeID")]
    pub hole_id: String,
    #[serde(rename = "mediaType")]
    pub media_type: &'static str,
    pub image: String,
    pub bands: Vec<HardnessBand>,
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    #[serde(rename = "projectID")]
    pub project_id: String,
    #[serde(rename = "mediaType")]
    pub media_type: &'static str,
    pub image: String,
    pub holes: usize,
}

async fn hole_samples(state: &AppState, project_id: &str, hole_id: &str) -> ApiResult<Vec<MwdSample>> {
    let rows = samples::load_hole_samples(&state.db, project_id, hole_id).await?;
    if rows.is_empty() {
        return Err(PipelineError::HoleNotFound(hole_id.to_string()).into());
    }
    Ok(rows)
}

/// GET /api/projects/:project_id/holes/:hole_id/plots/:feature
pub async fn plot_feature(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<FeaturePath>,
) -> ApiResult<Json<FeaturePlotResponse>> {
    let feature: Feature = path.feature.parse()?;
    let rows = hole_samples(&state, &path.project_id, &path.hole_id).await?;

    let hole_id = path.hole_id;
    let image = {
        let hole_id = hole_id.clone();
        run_blocking(&state, move || {
            Ok(render::feature_profile(&hole_id, &rows, feature)?)
        })
        .await?
    };

    Ok(Json(FeaturePlotResponse {
        hole_id,
        feature,
        media_type: CHART_MEDIA_TYPE,
        image,
    }))
}

/// GET /api/projects/:project_id/holes/:hole_id/plots
pub async fn plot_all_features(
    State(state): State<AppState>,
    ApiPath(HolePath { project_id, hole_id }): ApiPath<HolePath>,
) -> ApiResult<Json<HoleProfiles>> {
    let rows = hole_samples(&state, &project_id, &hole_id).await?;
    let profiles =
        run_blocking(&state, move || Ok(render::hole_profiles(&hole_id, &rows)?)).await?;
    Ok(Json(profiles))
}

/// GET /api/projects/:project_id/plots
///
/// Every hole of the project, ordered by hole id.
pub async fn plot_all_holes(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
) -> ApiResult<Json<Vec<HoleProfiles>>> {
    let rows = samples::load_project_samples(&state.db, &project_id).await?;

    let mut by_hole: BTreeMap<String, Vec<MwdSample>> = BTreeMap::new();
    for sample in rows {
        by_hole.entry(sample.hole_id.clone()).or_default().push(sample);
    }
    debug!("Project {}: rendering profiles for {} holes", project_id, by_hole.len());

    let all = run_blocking(&state, move || {
        let profiles = by_hole
            .iter()
            .map(|(hole_id, hole_rows)| render::hole_profiles(hole_id, hole_rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    })
    .await?;

    Ok(Json(all))
}

/// GET /api/projects/:project_id/holes/:hole_id/hardness
pub async fn plot_hardness(
    State(state): State<AppState>,
    ApiPath(HolePath { project_id, hole_id }): ApiPath<HolePath>,
) -> ApiResult<Json<HardnessResponse>> {
    let rows = hole_samples(&state, &project_id, &hole_id).await?;

    run_blocking(&state, move || {
        let bands = render::classify_hardness(&rows);
        let image = render::hardness_chart(&hole_id, &bands)?;
        Ok(Json(HardnessResponse {
            hole_id,
            media_type: CHART_MEDIA_TYPE,
            image,
            bands,
        }))
    })
    .await
}

/// GET /api/projects/:project_id/map
pub async fn plot_hole_map(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
) -> ApiResult<Json<MapResponse>> {
    let holes = positions::load_project_positions(&state.db, &project_id).await?;

    run_blocking(&state, move || {
        let image = render::hole_map(&project_id, &holes)?;
        Ok(Json(MapResponse {
            holes: holes.len(),
            project_id,
            media_type: CHART_MEDIA_TYPE,
            image,
        }))
    })
    .await
}
