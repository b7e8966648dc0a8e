//! Small preprocessing utilities applied before feature scoring.
//!
//! Provides per-column variance statistics and a filter that removes
//! columns which are constant on the training data. The filter is fit once
//! and then applied by name to any table with the same columns.

use ndarray::{Array1, Array2, Axis};

use crate::data_handling::FeatureTable;
use crate::error::PipelineError;

/// Per-column population variance of `x` (rows are samples).
pub fn column_variances(x: &Array2<f64>) -> Array1<f64> {
    if x.nrows() == 0 {
        return Array1::zeros(x.ncols());
    }
    x.var_axis(Axis(0), 0.0)
}

/// Columns kept and removed by a variance threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantFeatureFilter {
    pub keep: Vec<String>,
    pub dropped: Vec<String>,
}

impl ConstantFeatureFilter {
    /// Variance at or below which a column counts as constant.
    const MIN_VARIANCE: f64 = 0.0;

    /// Apply the filter to a table holding (at least) the kept columns.
    pub fn transform(&self, table: &FeatureTable) -> Result<FeatureTable, PipelineError> {
        table.select_columns(&self.keep)
    }
}

/// Fit a `ConstantFeatureFilter` on training features.
///
/// Every column is dropped if the training rows hold a single value; an
/// all-constant table is rejected since nothing would be left to score.
pub fn fit_constant_filter(table: &FeatureTable) -> Result<ConstantFeatureFilter, PipelineError> {
    if table.nrows() == 0 {
        return Err(PipelineError::EmptyDataset);
    }

    let variances = column_variances(table.values());
    let mut keep = Vec::new();
    let mut dropped = Vec::new();
    for (name, &var) in table.names().iter().zip(variances.iter()) {
        if var > ConstantFeatureFilter::MIN_VARIANCE {
            keep.push(name.clone());
        } else {
            dropped.push(name.clone());
        }
    }

    if keep.is_empty() {
        return Err(PipelineError::InvalidParameter(
            "every feature column is constant on the training data".to_string(),
        ));
    }

    log::debug!("Constant columns dropped: {:?}", dropped);
    Ok(ConstantFeatureFilter { keep, dropped })
}
