//! mwd-api library: drill-hole MWD analytics service
//!
//! Serves depth profiles, hardness bands, hole maps and cluster views of
//! Measurement While Drilling data, and stores blast-quality reports.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use mwd_common::config::ClusteringConfig;
use sqlx::SqlitePool;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pipeline;
pub mod render;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Defaults for clustering requests
    pub clustering: Arc<ClusteringConfig>,
    /// Per-request deadline enforced by the router
    pub request_timeout: Duration,
    /// Slots for clustering and rendering work on the blocking pool
    pub jobs: Arc<Semaphore>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            clustering: Arc::new(ClusteringConfig::default()),
            request_timeout: Duration::from_secs(60),
            jobs: Arc::new(Semaphore::new(4)),
        }
    }

    pub fn with_clustering(mut self, clustering: ClusteringConfig) -> Self {
        self.clustering = Arc::new(clustering);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Zero is treated as one; a semaphore without permits would stall every job
    pub fn with_max_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Arc::new(Semaphore::new(jobs.max(1)));
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, put};

    let timeout = state.request_timeout;

    let projects = Router::new()
        .route("/holes", get(api::list_holes))
        .route("/samples", put(api::replace_samples))
        .route("/positions", put(api::replace_positions))
        .route("/plots", get(api::plot_all_holes))
        .route("/map", get(api::plot_hole_map))
        .route("/cluster", get(api::cluster_scatter))
        .route("/cluster/shared", get(api::shared_cluster))
        .route("/holes/:hole_id/plots", get(api::plot_all_features))
        .route("/holes/:hole_id/plots/:feature", get(api::plot_feature))
        .route("/holes/:hole_id/hardness", get(api::plot_hardness))
        .route(
            "/holes/:hole_id/reports",
            get(api::list_reports).post(api::submit_report),
        )
        .route(
            "/holes/:hole_id/reports/:depth",
            get(api::get_report).delete(api::delete_report),
        );

    Router::new()
        .nest("/api/projects/:project_id", projects)
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
