//! HTTP error type
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}` with a
//! status code chosen by cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::pipeline::PipelineError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Clustering or lookup rejected the input
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// mwd-common error
    #[error(transparent)]
    Common(#[from] mwd_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use mwd_common::Error as CommonError;

        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Pipeline(err) => match err {
                PipelineError::HoleNotFound(_) => (StatusCode::NOT_FOUND, "HOLE_NOT_FOUND"),
                PipelineError::DegenerateInput(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "DEGENERATE_INPUT")
                }
                PipelineError::ColumnMismatch { .. } | PipelineError::LabelMismatch { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "SHAPE_MISMATCH")
                }
                PipelineError::InvalidClusterCount { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_CLUSTER_COUNT")
                }
                PipelineError::UnknownModel(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_MODEL"),
                PipelineError::UnknownLinkage(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_LINKAGE"),
                PipelineError::UnknownDataType(_) => {
                    (StatusCode::BAD_REQUEST, "UNKNOWN_DATA_TYPE")
                }
                PipelineError::InvalidDepth(_) => (StatusCode::BAD_REQUEST, "INVALID_DEPTH"),
                PipelineError::TooManyRows { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "TOO_MANY_ROWS")
                }
                PipelineError::Estimator(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "CLUSTERING_FAILED")
                }
            },
            ApiError::Render(RenderError::Empty(_)) => (StatusCode::NOT_FOUND, "NOTHING_TO_PLOT"),
            ApiError::Render(RenderError::Draw(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR")
            }
            ApiError::Internal(_) | ApiError::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::Common(err) => match err {
                CommonError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                CommonError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                CommonError::UnknownFeature(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_FEATURE"),
                CommonError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = match &self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
            ApiError::Common(mwd_common::Error::UnknownFeature(_)) => {
                "An incorrect feature name was given".to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!("{} ({}): {}", status, error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(PipelineError::HoleNotFound("H1".into())), StatusCode::NOT_FOUND),
            (
                ApiError::from(PipelineError::DegenerateInput("PenetrRate".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(PipelineError::InvalidClusterCount { k: 9, rows: 3 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(PipelineError::UnknownModel("dbscan".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(PipelineError::TooManyRows { rows: 50_001, max: 50_000 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                ApiError::from(PipelineError::Estimator("PCA: singular".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(mwd_common::Error::UnknownFeature("Torque".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(mwd_common::Error::NotFound("report".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(mwd_common::Error::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
