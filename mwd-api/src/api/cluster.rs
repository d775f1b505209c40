//! Clustering endpoints
//!
//! Each request reloads the project's samples and recomputes conditioning and
//! labels from scratch; nothing is cached between requests.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use mwd_common::config::ClusteringConfig;
use mwd_common::db::samples;
use mwd_common::MwdSample;
use ndarray::s;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::{ApiPath, ApiQuery};
use super::{run_blocking, ProjectPath};
use crate::error::{ApiError, ApiResult};
use crate::pipeline::condition::principal_components;
use crate::pipeline::{
    assign, condition, feature_matrix, locate_cluster, ClusterModel, ClusterOptions,
    ConditionMode, ConditionedMatrix, Linkage, PipelineResult,
};
use crate::render::{self, ScatterInput, CHART_MEDIA_TYPE};
use crate::AppState;

/// Query parameters shared by both clustering endpoints; omitted values fall
/// back to the `[clustering]` config section
#[derive(Debug, Default, Deserialize)]
pub struct ClusterQuery {
    pub data_type: Option<String>,
    pub k: Option<usize>,
    pub model: Option<String>,
    pub linkage: Option<String>,
}

/// [`ClusterQuery`] plus the target sample
#[derive(Debug, Default, Deserialize)]
pub struct SharedClusterQuery {
    #[serde(alias = "holeID")]
    pub hole_id: Option<String>,
    pub depth: Option<f64>,
    pub data_type: Option<String>,
    pub k: Option<usize>,
    pub model: Option<String>,
    pub linkage: Option<String>,
}

impl SharedClusterQuery {
    fn cluster_query(&self) -> ClusterQuery {
        ClusterQuery {
            data_type: self.data_type.clone(),
            k: self.k,
            model: self.model.clone(),
            linkage: self.linkage.clone(),
        }
    }
}

/// Fully resolved clustering parameters
#[derive(Debug, Clone, Copy)]
pub struct ClusterRequest {
    pub mode: ConditionMode,
    pub model: ClusterModel,
    pub k: usize,
    pub linkage: Linkage,
}

impl ClusterQuery {
    pub fn resolve(&self, defaults: &ClusteringConfig) -> ApiResult<ClusterRequest> {
        let mode: ConditionMode = self
            .data_type
            .as_deref()
            .unwrap_or(&defaults.default_data_type)
            .parse()?;
        let model: ClusterModel = self
            .model
            .as_deref()
            .unwrap_or(&defaults.default_model)
            .parse()?;
        let linkage: Linkage = self
            .linkage
            .as_deref()
            .unwrap_or(&defaults.default_linkage)
            .parse()?;

        Ok(ClusterRequest {
            mode,
            model,
            k: self.k.unwrap_or(defaults.default_k),
            linkage,
        })
    }
}

fn cluster_options(config: &ClusteringConfig) -> ClusterOptions {
    ClusterOptions {
        seed: config.seed,
        kmeans_n_init: config.kmeans_n_init,
        kmeans_max_iter: config.kmeans_max_iter,
        spectral_gamma: config.spectral_gamma,
        max_rows: config.max_rows,
    }
}

/// Condition the samples' features and label every row
fn label_samples(
    rows: &[MwdSample],
    request: &ClusterRequest,
    options: &ClusterOptions,
) -> PipelineResult<(ConditionedMatrix, Vec<usize>)> {
    let raw = feature_matrix(rows);
    let conditioned = condition(raw.view(), request.mode)?;
    let labels = assign(
        conditioned.values.view(),
        request.model,
        request.k,
        request.linkage,
        options,
    )?;
    Ok((conditioned, labels))
}

/// 2D coordinates for display, with axis names
///
/// PCA output already is a projection; standardized feature matrices are
/// projected onto their first two principal components.
fn display_projection(
    conditioned: &ConditionedMatrix,
) -> PipelineResult<([&'static str; 2], Vec<(f64, f64)>)> {
    let (axes, plane) = match conditioned.mode {
        ConditionMode::Pca => (["PC1", "PC2"], conditioned.values.slice(s![.., 0..2]).to_owned()),
        _ => (["x", "y"], principal_components(conditioned.values.view(), 2)?),
    };
    let points = plane.rows().into_iter().map(|r| (r[0], r[1])).collect();
    Ok((axes, points))
}

fn label_counts(labels: &[usize], k: usize) -> Vec<usize> {
    let mut counts = vec![0; k];
    for &label in labels {
        counts[label] += 1;
    }
    counts
}

async fn project_samples(state: &AppState, project_id: &str) -> ApiResult<Vec<MwdSample>> {
    let rows = samples::load_project_samples(&state.db, project_id).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(format!("project {} has no samples", project_id)));
    }
    Ok(rows)
}

#[derive(Debug, Serialize)]
pub struct ClusterResponse {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub model: String,
    pub data_type: String,
    pub k: usize,
    #[serde(rename = "mediaType")]
    pub media_type: &'static str,
    pub image: String,
    /// Samples per cluster label, indexed by label
    pub counts: Vec<usize>,
}

/// GET /api/projects/:project_id/cluster
pub async fn cluster_scatter(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
    ApiQuery(query): ApiQuery<ClusterQuery>,
) -> ApiResult<Json<ClusterResponse>> {
    let request = query.resolve(&state.clustering)?;
    let options = cluster_options(&state.clustering);
    let rows = project_samples(&state, &project_id).await?;

    run_blocking(&state, move || {
        let started = Instant::now();
        let (conditioned, labels) = label_samples(&rows, &request, &options)?;
        let (axis_labels, points) = display_projection(&conditioned)?;
        let depths: Vec<f64> = rows.iter().map(|s| s.depth).collect();

        let image = render::cluster_scatter(&ScatterInput {
            title: format!(
                "{} Clustering of {} data projected into 2D",
                request.model, project_id
            ),
            axis_labels,
            points,
            labels: &labels,
            depths: &depths,
        })?;

        info!(
            "Project {}: {} clustering of {} samples (k={}, {}) in {} ms",
            project_id,
            request.model,
            rows.len(),
            request.k,
            request.mode,
            started.elapsed().as_millis()
        );

        Ok(Json(ClusterResponse {
            counts: label_counts(&labels, request.k),
            project_id,
            model: request.model.to_string(),
            data_type: request.mode.to_string(),
            k: request.k,
            media_type: CHART_MEDIA_TYPE,
            image,
        }))
    })
    .await
}

#[derive(Debug, Serialize)]
pub struct SharedClusterResponse {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub cluster: usize,
    /// Sample of the requested hole closest to the requested depth
    pub nearest: MwdSample,
    pub count: usize,
    /// Every sample of the project in the same cluster, in acquisition order
    pub samples: Vec<MwdSample>,
}

/// GET /api/projects/:project_id/cluster/shared?hole_id=..&depth=..
pub async fn shared_cluster(
    State(state): State<AppState>,
    ApiPath(ProjectPath { project_id }): ApiPath<ProjectPath>,
    ApiQuery(query): ApiQuery<SharedClusterQuery>,
) -> ApiResult<Json<SharedClusterResponse>> {
    let hole_id = query
        .hole_id
        .clone()
        .ok_or_else(|| ApiError::BadRequest("hole_id is required".to_string()))?;
    let depth = query
        .depth
        .ok_or_else(|| ApiError::BadRequest("depth is required".to_string()))?;
    let request = query.cluster_query().resolve(&state.clustering)?;
    let options = cluster_options(&state.clustering);
    let rows = project_samples(&state, &project_id).await?;

    run_blocking(&state, move || {
        let (_, labels) = label_samples(&rows, &request, &options)?;
        let found = locate_cluster(&rows, &labels, &hole_id, depth)?;
        let members = found.subset(&rows);

        info!(
            "Project {}: {} @ {} m is in cluster {} ({} of {} samples)",
            project_id,
            hole_id,
            depth,
            found.cluster,
            members.len(),
            rows.len()
        );

        Ok(Json(SharedClusterResponse {
            project_id,
            cluster: found.cluster,
            nearest: found.nearest(&rows).clone(),
            count: members.len(),
            samples: members,
        }))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_falls_back_to_config_defaults() {
        let request = ClusterQuery::default()
            .resolve(&ClusteringConfig::default())
            .unwrap();
        assert_eq!(request.mode, ConditionMode::Pca);
        assert_eq!(request.model, ClusterModel::Agglomerative);
        assert_eq!(request.linkage, Linkage::Complete);
        assert_eq!(request.k, 4);
    }

    #[test]
    fn test_query_values_override_defaults() {
        let query = ClusterQuery {
            data_type: Some("Unweighted".to_string()),
            k: Some(2),
            model: Some("kmeans".to_string()),
            linkage: Some("ward".to_string()),
        };
        let request = query.resolve(&ClusteringConfig::default()).unwrap();
        assert_eq!(request.mode, ConditionMode::Raw);
        assert_eq!(request.model, ClusterModel::KMeans);
        assert_eq!(request.linkage, Linkage::Ward);
        assert_eq!(request.k, 2);
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let query = ClusterQuery {
            model: Some("birch".to_string()),
            ..ClusterQuery::default()
        };
        assert!(matches!(
            query.resolve(&ClusteringConfig::default()),
            Err(ApiError::Pipeline(_))
        ));
    }

    #[test]
    fn test_label_counts() {
        assert_eq!(label_counts(&[0, 2, 2, 1, 2], 3), vec![1, 1, 3]);
    }
}
