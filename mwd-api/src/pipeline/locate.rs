//! Nearest-record cluster lookup

use mwd_common::MwdSample;

use super::{PipelineError, PipelineResult};

/// Cluster of the sample nearest a (hole, depth) target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterMatch {
    pub cluster: usize,
    /// Position of the nearest sample in the input slice
    pub nearest_index: usize,
    /// Positions of every sample labeled `cluster`, in input order
    pub members: Vec<usize>,
}

impl ClusterMatch {
    pub fn nearest<'a>(&self, samples: &'a [MwdSample]) -> &'a MwdSample {
        &samples[self.nearest_index]
    }

    /// Member samples, cloned out of `samples`
    pub fn subset(&self, samples: &[MwdSample]) -> Vec<MwdSample> {
        self.members.iter().map(|&i| samples[i].clone()).collect()
    }
}

/// Find the cluster of the sample in `hole_id` closest to `target_depth`
///
/// `labels` must be positionally aligned with `samples`. Ties in depth
/// difference go to the first sample in input order.
pub fn locate_cluster(
    samples: &[MwdSample],
    labels: &[usize],
    hole_id: &str,
    target_depth: f64,
) -> PipelineResult<ClusterMatch> {
    if labels.len() != samples.len() {
        return Err(PipelineError::LabelMismatch {
            labels: labels.len(),
            rows: samples.len(),
        });
    }
    if !target_depth.is_finite() {
        return Err(PipelineError::InvalidDepth(target_depth));
    }

    // Original positions of the hole's samples
    let hole_rows = samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.hole_id == hole_id)
        .map(|(i, s)| (i, (s.depth - target_depth).abs()));

    let mut nearest: Option<(usize, f64)> = None;
    for (index, diff) in hole_rows {
        if nearest.map_or(true, |(_, best)| diff < best) {
            nearest = Some((index, diff));
        }
    }

    let (nearest_index, _) =
        nearest.ok_or_else(|| PipelineError::HoleNotFound(hole_id.to_string()))?;
    let cluster = labels[nearest_index];
    let members = labels
        .iter()
        .enumerate()
        .filter(|(_, &label)| label == cluster)
        .map(|(i, _)| i)
        .collect();

    Ok(ClusterMatch {
        cluster,
        nearest_index,
        members,
    })
}
