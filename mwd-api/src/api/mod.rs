//! HTTP API handlers for mwd-api

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub mod buildinfo;
pub mod cluster;
pub mod extract;
pub mod health;
pub mod holes;
pub mod plots;
pub mod reports;

pub use buildinfo::get_build_info;
pub use cluster::{cluster_scatter, shared_cluster};
pub use health::health_routes;
pub use holes::{list_holes, replace_positions, replace_samples};
pub use plots::{plot_all_features, plot_all_holes, plot_feature, plot_hardness, plot_hole_map};
pub use reports::{delete_report, get_report, list_reports, submit_report};

/// `/api/projects/:project_id`
#[derive(Debug, Deserialize)]
pub struct ProjectPath {
    pub project_id: String,
}

/// `/api/projects/:project_id/holes/:hole_id`
#[derive(Debug, Deserialize)]
pub struct HolePath {
    pub project_id: String,
    pub hole_id: String,
}

/// Run CPU-bound work (clustering, rendering) off the async runtime
///
/// At most `max_concurrent_jobs` closures run at once. The slot is held by the
/// blocking task itself, so a request dropped by the timeout layer keeps its
/// slot until the work actually finishes.
pub(crate) async fn run_blocking<T, F>(state: &AppState, work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let permit = state
        .jobs
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ApiError::Internal(format!("Job queue closed: {}", e)))?;

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Worker task failed: {}", e)))?
}
