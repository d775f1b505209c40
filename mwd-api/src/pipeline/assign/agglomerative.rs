//! Bottom-up hierarchical clustering through `kodama`
//!
//! `kodama::linkage` builds the full dendrogram from condensed pairwise
//! Euclidean distances; its steps come back sorted by merge height, with
//! step `i` creating cluster `n + i`. Applying the first `n - k` steps cuts the
//! tree at `k` clusters.

use kodama::Method;
use ndarray::ArrayView2;

use super::{squared_distance, Linkage};

impl Linkage {
    fn method(self) -> Method {
        match self {
            Linkage::Complete => Method::Complete,
            Linkage::Average => Method::Average,
            Linkage::Single => Method::Single,
            Linkage::Ward => Method::Ward,
        }
    }
}

/// Upper-triangular pairwise distances, row-major, diagonal excluded
fn condensed_distances(data: ArrayView2<f64>) -> Vec<f64> {
    let n = data.nrows();
    let mut values = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            values.push(squared_distance(&data.row(i), &data.row(j)).sqrt());
        }
    }
    values
}

/// Cluster rows into `k` groups; labels are numbered by first appearance
///
/// Expects `1 <= k <= rows`.
pub fn agglomerative_labels(data: ArrayView2<f64>, k: usize, linkage: Linkage) -> Vec<usize> {
    let n = data.nrows();
    let mut distances = condensed_distances(data);
    let dendrogram = kodama::linkage(&mut distances, n, linkage.method());
    let merges = dendrogram.steps().iter().map(|step| (step.cluster1, step.cluster2));
    cut_tree(merges, n, k)
}

/// Apply the first `n - k` merges; merge `i` creates cluster `n + i`
fn cut_tree(merges: impl Iterator<Item = (usize, usize)>, n: usize, k: usize) -> Vec<usize> {
    let mut parent: Vec<usize> = (0..2 * n).collect();
    for (i, (a, b)) in merges.take(n.saturating_sub(k)).enumerate() {
        parent[a] = n + i;
        parent[b] = n + i;
    }

    let root = |mut node: usize| {
        while parent[node] != node {
            node = parent[node];
        }
        node
    };

    let mut numbering: Vec<Option<usize>> = vec![None; parent.len()];
    let mut next = 0;
    (0..n)
        .map(|row| {
            let r = root(row);
            *numbering[r].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_condensed_layout() {
        let data = array![[0.0], [1.0], [3.0], [7.0]];
        assert_eq!(
            condensed_distances(data.view()),
            vec![1.0, 3.0, 7.0, 2.0, 6.0, 4.0]
        );
    }

    #[test]
    fn test_single_linkage_chains_neighbors() {
        // Gaps 1, 1, 1, 5
        let data = array![[0.0], [1.0], [2.0], [3.0], [8.0]];
        let labels = agglomerative_labels(data.view(), 2, Linkage::Single);
        assert_eq!(labels, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_complete_linkage_differs_from_single() {
        let data = array![[0.0], [1.1], [2.3], [3.6], [5.0]];
        let single = agglomerative_labels(data.view(), 2, Linkage::Single);
        let complete = agglomerative_labels(data.view(), 2, Linkage::Complete);
        assert_eq!(single, vec![0, 0, 0, 0, 1]);
        assert_eq!(complete, vec![0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_labels_numbered_by_first_appearance() {
        let data = array![[10.0], [0.0], [10.1], [0.1]];
        let labels = agglomerative_labels(data.view(), 2, Linkage::Average);
        assert_eq!(labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_k_equals_n_gives_singletons() {
        let data = array![[0.0], [1.0], [2.0]];
        let labels = agglomerative_labels(data.view(), 3, Linkage::Ward);
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_cut_applies_lowest_merges() {
        // 0+1 -> 3, then 3+2 -> 4
        let merges = [(0, 1), (2, 3)];
        assert_eq!(cut_tree(merges.into_iter(), 3, 2), vec![0, 0, 1]);
        assert_eq!(cut_tree(merges.into_iter(), 3, 1), vec![0, 0, 0]);
        assert_eq!(cut_tree(merges.into_iter(), 3, 3), vec![0, 1, 2]);
    }
}
