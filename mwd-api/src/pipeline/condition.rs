//! Feature conditioning: standardization, weighting and PCA
//!
//! Statistics are batch-relative: mean and standard deviation come from the
//! rows being conditioned, never from a stored reference distribution.
//! Scaling uses `linfa-preprocessing` and projection uses `linfa-reduction`.

use std::fmt;
use std::str::FromStr;

use linfa::traits::{Fit, Predict, Transformer};
use linfa::DatasetBase;
use linfa_preprocessing::linear_scaling::LinearScaler;
use linfa_reduction::Pca;
use mwd_common::{Feature, MwdSample};
use ndarray::{s, Array2, ArrayView2, Axis};

use super::{PipelineError, PipelineResult};

/// Per-feature weights for [`ConditionMode::Weighted`], canonical column order.
/// Normalized to sum to 1 before use.
pub const FEATURE_WEIGHTS: [f64; 5] = [1.15, 1.0, 1.0, 1.0, 1.25];

/// Number of principal components kept by [`ConditionMode::Pca`]
pub const PCA_COMPONENTS: usize = 3;

/// How standardized features are transformed before clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionMode {
    /// Standardized columns unchanged
    Raw,
    /// Standardized columns scaled by [`FEATURE_WEIGHTS`]
    Weighted,
    /// Projection onto the first three principal components
    Pca,
}

impl ConditionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionMode::Raw => "raw",
            ConditionMode::Weighted => "weighted",
            ConditionMode::Pca => "pca",
        }
    }
}

impl fmt::Display for ConditionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionMode {
    type Err = PipelineError;

    /// Accepts `raw`, `unweighted`, `weighted` and `pca`, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "unweighted" => Ok(ConditionMode::Raw),
            "weighted" => Ok(ConditionMode::Weighted),
            "pca" => Ok(ConditionMode::Pca),
            _ => Err(PipelineError::UnknownDataType(s.to_string())),
        }
    }
}

/// Conditioned feature matrix; row `i` corresponds to input row `i`
#[derive(Debug, Clone)]
pub struct ConditionedMatrix {
    pub mode: ConditionMode,
    pub column_names: Vec<String>,
    pub values: Array2<f64>,
}

impl ConditionedMatrix {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}

/// Build the `rows x 5` matrix of raw feature values in canonical column order
pub fn feature_matrix(samples: &[MwdSample]) -> Array2<f64> {
    let mut matrix = Array2::zeros((samples.len(), Feature::ALL.len()));
    for (mut row, sample) in matrix.rows_mut().into_iter().zip(samples) {
        for (cell, value) in row.iter_mut().zip(sample.features()) {
            *cell = value;
        }
    }
    matrix
}

/// Standardize, then apply `mode`
pub fn condition(data: ArrayView2<f64>, mode: ConditionMode) -> PipelineResult<ConditionedMatrix> {
    let standardized = standardize(data)?;

    let (values, column_names) = match mode {
        ConditionMode::Raw => {
            let names = feature_column_names(standardized.ncols());
            (standardized, names)
        }
        ConditionMode::Weighted => {
            if standardized.ncols() != FEATURE_WEIGHTS.len() {
                return Err(PipelineError::ColumnMismatch {
                    expected: "exactly 5",
                    actual: standardized.ncols(),
                });
            }
            let weighted = apply_weights(standardized, &FEATURE_WEIGHTS)?;
            (weighted, feature_column_names(FEATURE_WEIGHTS.len()))
        }
        ConditionMode::Pca => {
            if standardized.ncols() < PCA_COMPONENTS {
                return Err(PipelineError::ColumnMismatch {
                    expected: "at least 3",
                    actual: standardized.ncols(),
                });
            }
            let projected = principal_components(standardized.view(), PCA_COMPONENTS)?;
            let names = (1..=PCA_COMPONENTS).map(|i| format!("PC{i}")).collect();
            (projected, names)
        }
    };

    Ok(ConditionedMatrix {
        mode,
        column_names,
        values,
    })
}

/// Zero mean, unit population variance per column
///
/// Fails on an empty batch or any column whose standard deviation is zero.
pub fn standardize(data: ArrayView2<f64>) -> PipelineResult<Array2<f64>> {
    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| PipelineError::DegenerateInput("no samples to standardize".to_string()))?;
    let std = data.std_axis(Axis(0), 0.0);

    for (col, (&sd, &mu)) in std.iter().zip(mean.iter()).enumerate() {
        // Relative threshold: constant columns leave rounding noise in std
        if !(sd > 10.0 * f64::EPSILON * mu.abs().max(1.0)) {
            return Err(PipelineError::DegenerateInput(format!(
                "feature column {} has zero variance",
                column_label(col)
            )));
        }
    }

    let dataset = DatasetBase::from(data.to_owned());
    let scaler = LinearScaler::standard()
        .fit(&dataset)
        .map_err(|e| PipelineError::Estimator(format!("standardization: {}", e)))?;
    Ok(scaler.transform(dataset.records))
}

/// Multiply each column by its weight, weights first normalized to sum to 1
pub fn apply_weights(mut data: Array2<f64>, weights: &[f64]) -> PipelineResult<Array2<f64>> {
    if weights.len() != data.ncols() {
        return Err(PipelineError::ColumnMismatch {
            expected: "one weight per column",
            actual: data.ncols(),
        });
    }
    let total: f64 = weights.iter().sum();
    for (mut column, weight) in data.columns_mut().into_iter().zip(weights) {
        column *= weight / total;
    }
    Ok(data)
}

/// Project `data` onto its first `n_components` principal components
///
/// Components are ordered by explained variance, descending. Each component's
/// sign is fixed so that its largest-magnitude score is positive, which makes
/// the output independent of the solver's sign choice. Components beyond what the
/// batch can support (`rows - 1` or `cols`) are returned as zero columns.
pub fn principal_components(
    data: ArrayView2<f64>,
    n_components: usize,
) -> PipelineResult<Array2<f64>> {
    let (rows, cols) = data.dim();
    let n_components = n_components.min(cols);
    let mut projected = Array2::zeros((rows, n_components));

    // Centered data has rank at most rows - 1
    let fitted = n_components.min(rows.saturating_sub(1));
    if fitted == 0 {
        return Ok(projected);
    }

    let dataset = DatasetBase::from(data.to_owned());
    let pca = Pca::params(fitted)
        .fit(&dataset)
        .map_err(|e| PipelineError::Estimator(format!("PCA: {}", e)))?;
    let scores: Array2<f64> = pca.predict(&dataset.records);

    for (component, column) in scores.columns().into_iter().enumerate() {
        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(1.0);
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        projected
            .slice_mut(s![.., component])
            .assign(&column.mapv(|v| sign * v));
    }

    Ok(projected)
}

fn feature_column_names(ncols: usize) -> Vec<String> {
    (0..ncols).map(column_label).collect()
}

fn column_label(col: usize) -> String {
    Feature::ALL
        .get(col)
        .map(|f| f.column_name().to_string())
        .unwrap_or_else(|| format!("column{col}"))
}
