//! Data preparation and clustering pipeline
//!
//! Three stages, each a pure function over in-memory data:
//! 1. [`condition`]: standardize features, then weight them or project onto
//!    principal components
//! 2. [`assign`]: label every row with one of `k` clusters
//! 3. [`locate_cluster`]: find the cluster of the sample nearest a (hole, depth)
//!    and every sample sharing it
//!
//! Nothing here touches storage; handlers load samples, run the pipeline on a
//! blocking thread and render or serialize the result.

use thiserror::Error;

pub mod assign;
pub mod condition;
pub mod locate;

pub use assign::{assign, ClusterModel, ClusterOptions, Linkage};
pub use condition::{condition, feature_matrix, ConditionMode, ConditionedMatrix};
pub use locate::{locate_cluster, ClusterMatch};

/// Pipeline failures; all are caused by the input and are not retriable
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// Zero-variance column or empty batch; standardization is undefined
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Expected {expected} feature columns, got {actual}")]
    ColumnMismatch { expected: &'static str, actual: usize },

    #[error("Invalid cluster count k={k}: must be between 1 and {rows} (number of samples)")]
    InvalidClusterCount { k: usize, rows: usize },

    #[error("Unknown clustering model '{0}' (expected kmeans, agglom or spectral)")]
    UnknownModel(String),

    #[error("Unknown linkage '{0}' (expected complete, average, single or ward)")]
    UnknownLinkage(String),

    #[error("Unknown data type '{0}' (expected raw, unweighted, weighted or pca)")]
    UnknownDataType(String),

    #[error("No samples found for hole {0}")]
    HoleNotFound(String),

    #[error("Target depth must be a finite number, got {0}")]
    InvalidDepth(f64),

    #[error("Label vector has {labels} entries for {rows} samples")]
    LabelMismatch { labels: usize, rows: usize },

    #[error("{rows} samples exceed the clustering limit of {max}")]
    TooManyRows { rows: usize, max: usize },

    /// The numeric backend rejected the conditioned matrix
    #[error("Estimator failed: {0}")]
    Estimator(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
