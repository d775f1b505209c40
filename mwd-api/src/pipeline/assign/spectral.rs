//! Spectral clustering: RBF kernel, diffusion-map embedding, then k-means
//!
//! The Gaussian kernel `exp(-gamma * ||a - b||^2)` comes from `linfa-kernel`
//! and the normalized-graph embedding from `linfa-reduction`'s diffusion map.
//! The embedding keeps up to `k` non-trivial eigenvectors, capped at `rows - 1`.

use linfa::traits::Transformer;
use linfa_kernel::{Kernel, KernelMethod, KernelType};
use linfa_reduction::DiffusionMap;
use ndarray::ArrayView2;

use super::kmeans::kmeans_labels;
use super::ClusterOptions;
use crate::pipeline::{PipelineError, PipelineResult};

/// Label rows by k-means over their spectral embedding
///
/// Expects `2 <= k <= rows`.
pub fn spectral_labels(
    data: ArrayView2<f64>,
    k: usize,
    options: &ClusterOptions,
) -> PipelineResult<Vec<usize>> {
    let kernel = Kernel::params()
        .kind(KernelType::Dense)
        .method(KernelMethod::Gaussian(1.0 / options.spectral_gamma))
        .transform(data);

    let embedding_size = k.min(data.nrows() - 1);
    let diffusion = DiffusionMap::<f64>::params(embedding_size)
        .steps(1)
        .transform(&kernel)
        .map_err(|e| PipelineError::Estimator(format!("spectral embedding: {}", e)))?;

    kmeans_labels(diffusion.embedding().view(), k, options)
}
