//! Cluster assignment
//!
//! Three interchangeable strategies share one entry point, [`assign`]. Labels
//! are opaque integers in `0..k`; only co-membership is meaningful.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::{PipelineError, PipelineResult};

mod agglomerative;
mod kmeans;
mod spectral;

pub use agglomerative::agglomerative_labels;
pub use kmeans::kmeans_labels;
pub use spectral::spectral_labels;

/// Clustering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterModel {
    KMeans,
    Agglomerative,
    Spectral,
}

impl ClusterModel {
    /// Name used in chart titles
    pub fn display_name(self) -> &'static str {
        match self {
            ClusterModel::KMeans => "KMeans",
            ClusterModel::Agglomerative => "Agglomerative",
            ClusterModel::Spectral => "Spectral",
        }
    }
}

impl fmt::Display for ClusterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ClusterModel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kmeans" | "k-means" => Ok(ClusterModel::KMeans),
            "agglom" | "agglomerative" => Ok(ClusterModel::Agglomerative),
            "spectral" => Ok(ClusterModel::Spectral),
            _ => Err(PipelineError::UnknownModel(s.to_string())),
        }
    }
}

/// Merge criterion for agglomerative clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Maximum pairwise distance between members
    Complete,
    /// Mean pairwise distance between members
    Average,
    /// Minimum pairwise distance between members
    Single,
    /// Minimum increase in within-cluster variance
    Ward,
}

impl FromStr for Linkage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            "single" => Ok(Linkage::Single),
            "ward" => Ok(Linkage::Ward),
            _ => Err(PipelineError::UnknownLinkage(s.to_string())),
        }
    }
}

/// Tuning knobs for the randomized strategies
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Fixed RNG seed; `None` seeds from OS entropy on every call
    pub seed: Option<u64>,
    pub kmeans_n_init: usize,
    pub kmeans_max_iter: usize,
    /// RBF coefficient for spectral affinity
    pub spectral_gamma: f64,
    /// Largest matrix [`assign`] will cluster
    pub max_rows: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            seed: None,
            kmeans_n_init: 10,
            kmeans_max_iter: 300,
            spectral_gamma: 1.0,
            max_rows: 20_000,
        }
    }
}

impl ClusterOptions {
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Label every row of `matrix` with one of `k` clusters
///
/// `linkage` is only consulted for [`ClusterModel::Agglomerative`].
pub fn assign(
    matrix: ArrayView2<f64>,
    model: ClusterModel,
    k: usize,
    linkage: Linkage,
    options: &ClusterOptions,
) -> PipelineResult<Vec<usize>> {
    let rows = matrix.nrows();
    if rows > options.max_rows {
        return Err(PipelineError::TooManyRows {
            rows,
            max: options.max_rows,
        });
    }
    if k == 0 || k > rows {
        return Err(PipelineError::InvalidClusterCount { k, rows });
    }

    debug!(
        "Clustering {} rows into {} clusters with {} ({:?} linkage)",
        rows, k, model, linkage
    );

    if k == 1 {
        return Ok(vec![0; rows]);
    }

    match model {
        ClusterModel::KMeans => kmeans_labels(matrix, k, options),
        ClusterModel::Agglomerative => Ok(agglomerative_labels(matrix, k, linkage)),
        ClusterModel::Spectral => spectral_labels(matrix, k, options),
    }
}

/// Squared Euclidean distance between two equal-length rows
pub(crate) fn squared_distance<'a>(
    a: impl IntoIterator<Item = &'a f64>,
    b: impl IntoIterator<Item = &'a f64>,
) -> f64 {
    a.into_iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use std::collections::HashSet;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.0, 0.1],
            [0.2, 0.0],
            [0.1, 0.2],
            [-0.1, 0.0],
            [0.0, -0.2],
            [10.0, 10.1],
            [10.2, 9.9],
            [9.9, 10.0],
            [10.1, 10.2],
            [10.0, 9.8],
        ]
    }

    fn seeded() -> ClusterOptions {
        ClusterOptions {
            seed: Some(7),
            ..ClusterOptions::default()
        }
    }

    fn assert_blobs_separated(labels: &[usize]) {
        assert_eq!(labels.len(), 10);
        assert!(labels[..5].iter().all(|&l| l == labels[0]), "{:?}", labels);
        assert!(labels[5..].iter().all(|&l| l == labels[5]), "{:?}", labels);
        assert_ne!(labels[0], labels[5]);
    }

    #[test]
    fn test_every_model_separates_two_blobs() {
        let data = two_blobs();
        for model in [ClusterModel::KMeans, ClusterModel::Agglomerative, ClusterModel::Spectral] {
            let labels = assign(data.view(), model, 2, Linkage::Complete, &seeded()).unwrap();
            assert_blobs_separated(&labels);
        }
    }

    #[test]
    fn test_every_linkage_separates_two_blobs() {
        let data = two_blobs();
        for linkage in [Linkage::Complete, Linkage::Average, Linkage::Single, Linkage::Ward] {
            let labels =
                assign(data.view(), ClusterModel::Agglomerative, 2, linkage, &seeded()).unwrap();
            assert_blobs_separated(&labels);
        }
    }

    #[test]
    fn test_kmeans_yields_exactly_k_labels() {
        let data = two_blobs();
        for k in 1..=4 {
            let labels = assign(data.view(), ClusterModel::KMeans, k, Linkage::Complete, &seeded())
                .unwrap();
            let distinct: HashSet<usize> = labels.iter().copied().collect();
            assert_eq!(distinct.len(), k, "k={} labels={:?}", k, labels);
            assert!(labels.iter().all(|&l| l < k));
        }
    }

    #[test]
    fn test_agglomerative_yields_exactly_k_labels() {
        let data = two_blobs();
        for k in 1..=data.nrows() {
            let labels = assign(
                data.view(),
                ClusterModel::Agglomerative,
                k,
                Linkage::Average,
                &seeded(),
            )
            .unwrap();
            let distinct: HashSet<usize> = labels.iter().copied().collect();
            assert_eq!(distinct.len(), k, "k={}", k);
        }
    }

    #[test]
    fn test_k_out_of_range() {
        let data = two_blobs();
        for k in [0, 11] {
            let err = assign(data.view(), ClusterModel::KMeans, k, Linkage::Ward, &seeded())
                .unwrap_err();
            assert_eq!(err, PipelineError::InvalidClusterCount { k, rows: 10 });
        }
    }

    #[test]
    fn test_row_cap_rejects_before_clustering() {
        let data = two_blobs();
        let options = ClusterOptions {
            max_rows: 9,
            ..seeded()
        };
        for model in [ClusterModel::KMeans, ClusterModel::Agglomerative, ClusterModel::Spectral] {
            let err = assign(data.view(), model, 2, Linkage::Ward, &options).unwrap_err();
            assert_eq!(err, PipelineError::TooManyRows { rows: 10, max: 9 });
        }

        let at_cap = ClusterOptions {
            max_rows: 10,
            ..seeded()
        };
        assert!(assign(data.view(), ClusterModel::KMeans, 2, Linkage::Ward, &at_cap).is_ok());
    }

    #[test]
    fn test_same_seed_same_labels() {
        let data = two_blobs();
        let a = assign(data.view(), ClusterModel::KMeans, 3, Linkage::Ward, &seeded()).unwrap();
        let b = assign(data.view(), ClusterModel::KMeans, 3, Linkage::Ward, &seeded()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_configurable_name_parses() {
        use mwd_common::config::{DATA_TYPE_NAMES, LINKAGE_NAMES, MODEL_NAMES};

        for name in MODEL_NAMES {
            assert!(name.parse::<ClusterModel>().is_ok(), "{}", name);
        }
        for name in LINKAGE_NAMES {
            assert!(name.parse::<Linkage>().is_ok(), "{}", name);
        }
        for name in DATA_TYPE_NAMES {
            assert!(name.parse::<crate::pipeline::ConditionMode>().is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_model_parsing() {
        assert_eq!("agglom".parse::<ClusterModel>().unwrap(), ClusterModel::Agglomerative);
        assert_eq!("KMeans".parse::<ClusterModel>().unwrap(), ClusterModel::KMeans);
        assert_eq!("spectral".parse::<ClusterModel>().unwrap(), ClusterModel::Spectral);
        assert_eq!(
            "dbscan".parse::<ClusterModel>().unwrap_err(),
            PipelineError::UnknownModel("dbscan".to_string())
        );
        assert!(matches!(
            "centroid".parse::<Linkage>(),
            Err(PipelineError::UnknownLinkage(_))
        ));
    }
}
