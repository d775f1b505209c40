//! k-means through `linfa-clustering`
//!
//! k-means++ seeding, `n_init` independent runs with the lowest-inertia run
//! kept. The RNG comes from [`ClusterOptions`] so a configured seed makes the
//! labels reproducible.
//!
//! linfa can leave a centroid without members. When that happens the fit is
//! repeated from a seed drawn off the same RNG, a bounded number of times.

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::ClusterOptions;
use crate::pipeline::{PipelineError, PipelineResult};

/// Convergence threshold on centroid movement between iterations
const TOLERANCE: f64 = 1e-4;

/// Fits tried before accepting a result with empty clusters
const MAX_ATTEMPTS: usize = 3;

/// Label every row with the index of its k-means cluster
pub fn kmeans_labels(
    data: ArrayView2<f64>,
    k: usize,
    options: &ClusterOptions,
) -> PipelineResult<Vec<usize>> {
    let dataset = DatasetBase::from(data.to_owned());
    let mut rng = options.rng();

    let mut best: Option<(usize, Vec<usize>)> = None;
    for _ in 0..MAX_ATTEMPTS {
        let model = KMeans::params_with_rng(k, StdRng::seed_from_u64(rng.gen()))
            .n_runs(options.kmeans_n_init)
            .max_n_iterations(options.kmeans_max_iter as u64)
            .tolerance(TOLERANCE)
            .fit(&dataset)
            .map_err(|e| PipelineError::Estimator(format!("k-means: {}", e)))?;

        let labels = model.predict(&dataset.records).to_vec();
        let used = distinct_labels(&labels, k);
        if used == k {
            return Ok(labels);
        }
        if best.as_ref().map_or(true, |(most, _)| used > *most) {
            best = Some((used, labels));
        }
    }

    let (used, labels) = best.ok_or_else(|| PipelineError::Estimator("k-means: no fit".into()))?;
    debug!("k-means left {} of {} clusters empty", k - used, k);
    Ok(labels)
}

fn distinct_labels(labels: &[usize], k: usize) -> usize {
    let mut seen = vec![false; k];
    for &label in labels {
        if let Some(slot) = seen.get_mut(label) {
            *slot = true;
        }
    }
    seen.into_iter().filter(|&s| s).count()
}
