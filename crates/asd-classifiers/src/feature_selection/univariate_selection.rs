//! Univariate feature selection methods following scikit-learn's API.
//!
//! See: https://scikit-learn.org/stable/modules/feature_selection.html#univariate-feature-selection

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

use crate::data_handling::FeatureTable;
use crate::error::PipelineError;

/// Scoring function used to rank features against the class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFunction {
    /// Chi-squared statistic of non-negative features vs. class.
    #[default]
    Chi2,
    /// Univariate linear regression F-statistic.
    FRegression,
}

/// Compute row-wise (squared) Euclidean norms of a 2D array.
///
/// # Parameters
///
/// * `x` - A 2D array of shape (n_samples, n_features).
/// * `squared` - Return squared norms instead of norms.
///
/// # Returns
///
/// An array of shape (n_samples,) holding the row norms.
pub fn row_norms<S>(x: &ArrayBase<S, Ix2>, squared: bool) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    x.axis_iter(Axis(0))
        .map(|row| {
            let sum_of_squares: f64 = row.iter().map(|&val| val * val).sum();
            if squared {
                sum_of_squares
            } else {
                sum_of_squares.sqrt()
            }
        })
        .collect()
}

/// Compute chi-squared stats between each non-negative feature and class.
///
/// The observed value of a (class, feature) cell is the sum of the feature
/// over the rows of that class; the expected value is the class frequency
/// times the feature total. A feature whose total is zero yields NaN.
///
/// # Parameters
///
/// * `x` - A 2D array of shape (n_samples, n_features), all values >= 0.
/// * `y` - Class labels, one per sample.
///
/// # Returns
///
/// `(chi2, p_values)`, both of shape (n_features,). P-values come from the
/// chi-squared survival function with `n_classes - 1` degrees of freedom.
///
/// # Examples
///
/// ```rust
/// use asd_classifiers::feature_selection::univariate_selection::chi2;
/// use ndarray::array;
///
/// let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
/// let y = array![1, 0, 1, 0];
/// let (scores, _p) = chi2(&x, &y).unwrap();
/// assert!((scores[0] - 2.0).abs() < 1e-12);
/// ```
pub fn chi2(x: &Array2<f64>, y: &Array1<i64>) -> Result<(Array1<f64>, Array1<f64>), PipelineError> {
    check_xy(x, y)?;

    if let Some(((_, column), &value)) = x.indexed_iter().find(|(_, &v)| v < 0.0) {
        return Err(PipelineError::NegativeValues { column, value });
    }

    let classes: Vec<i64> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if classes.len() < 2 {
        return Err(PipelineError::SingleClass(classes.len()));
    }

    let n_samples = x.nrows() as f64;
    let n_features = x.ncols();

    let mut observed = Array2::<f64>::zeros((classes.len(), n_features));
    let mut class_counts = vec![0usize; classes.len()];
    for (row, &label) in x.axis_iter(Axis(0)).zip(y.iter()) {
        let Ok(k) = classes.binary_search(&label) else {
            continue;
        };
        class_counts[k] += 1;
        let mut obs_row = observed.row_mut(k);
        obs_row += &row;
    }

    let feature_count = x.sum_axis(Axis(0));

    let mut scores = Array1::<f64>::zeros(n_features);
    for (k, &count) in class_counts.iter().enumerate() {
        let class_prob = count as f64 / n_samples;
        for f in 0..n_features {
            let expected = class_prob * feature_count[f];
            let diff = observed[(k, f)] - expected;
            scores[f] += diff * diff / expected;
        }
    }

    let dist = ChiSquared::new((classes.len() - 1) as f64)
        .map_err(|e| PipelineError::InvalidParameter(e.to_string()))?;
    let p_values = scores.mapv(|s| if s.is_nan() { f64::NAN } else { dist.sf(s) });

    Ok((scores, p_values))
}

/// Compute Pearson's r for each feature and the target.
///
/// # Parameters
///
/// * `x` - A 2D array of shape (n_samples, n_features).
/// * `y` - Target vector of shape (n_samples,).
/// * `center` - Subtract the means of `x` and `y` before correlating.
/// * `force_finite` - Replace non-finite coefficients (constant columns) by 0.0.
pub fn r_regression(x: &Array2<f64>, y: &Array1<f64>, center: bool, force_finite: bool) -> Array1<f64> {
    let n_samples = x.nrows() as f64;
    let n_features = x.ncols();

    let mut y_centered = y.to_owned();
    let mut x_means = Array1::zeros(n_features);

    let x_norms = if center {
        let y_mean = y.mean().unwrap_or(0.0);
        y_centered -= y_mean;
        x_means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_features));

        // Scaled standard deviations via moments
        let x_squared_norms = row_norms(&x.t(), true);
        (&x_squared_norms - &(x_means.mapv(|m: f64| m * m) * n_samples)).mapv(|v| v.max(0.0).sqrt())
    } else {
        row_norms(&x.t(), false)
    };

    let mut correlation_coefficient = Array1::<f64>::zeros(n_features);
    for (i, col) in x.columns().into_iter().enumerate() {
        let centered_col = col.mapv(|v| v - x_means[i]);
        correlation_coefficient[i] = centered_col.dot(&y_centered);
    }

    let y_norm = y_centered.dot(&y_centered).sqrt();
    correlation_coefficient /= &x_norms;
    correlation_coefficient /= y_norm;

    if force_finite {
        correlation_coefficient.mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });
    }

    correlation_coefficient
}

/// Univariate linear regression tests returning F-statistic and p-values.
///
/// Labels are treated as a numeric target. Constant features get an
/// F-statistic of 0 and a p-value of 1; perfectly correlated features get
/// `f64::MAX` and 0.
pub fn f_regression(x: &Array2<f64>, y: &Array1<i64>) -> Result<(Array1<f64>, Array1<f64>), PipelineError> {
    check_xy(x, y)?;
    if x.nrows() < 3 {
        return Err(PipelineError::InvalidParameter(format!(
            "f_regression needs at least 3 samples, got {}",
            x.nrows()
        )));
    }

    let y = y.mapv(|v| v as f64);
    let correlation_coefficient = r_regression(x, &y, true, true);
    let deg_of_freedom = y.len() as f64 - 2.0;

    let corr_coef_squared = correlation_coefficient.mapv(|r| r * r);
    let mut f_statistic = corr_coef_squared.mapv(|r2| r2 / (1.0 - r2) * deg_of_freedom);

    let f_dist = FisherSnedecor::new(1.0, deg_of_freedom)
        .map_err(|e| PipelineError::InvalidParameter(e.to_string()))?;
    let mut p_values = f_statistic.mapv(|f| f_dist.sf(f));

    for i in 0..f_statistic.len() {
        if f_statistic[i].is_infinite() {
            f_statistic[i] = f64::MAX;
            p_values[i] = 0.0;
        } else if f_statistic[i].is_nan() {
            f_statistic[i] = 0.0;
            p_values[i] = 1.0;
        }
    }

    Ok((f_statistic, p_values))
}

fn check_xy(x: &Array2<f64>, y: &Array1<i64>) -> Result<(), PipelineError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(PipelineError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: format!("{} labels", x.nrows()),
            got: format!("{} labels", y.len()),
        });
    }
    Ok(())
}

/// Every index of `scores`, best first.
///
/// NaN ranks at the bottom of the float range and equal scores put the
/// higher column index first, so the last of a run of ties is kept when a
/// cut falls inside it (the ordering a stable ascending argsort gives).
fn ranked_indices(scores: &Array1<f64>) -> Vec<usize> {
    let rank_key = |s: f64| if s.is_nan() { f64::MIN } else { s };
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&i, &j| {
        rank_key(scores[j])
            .total_cmp(&rank_key(scores[i]))
            .then(j.cmp(&i))
    });
    indices
}

/// Indices of the `k` highest scores, returned in ascending index order.
///
/// Ties at the cut are broken in favour of the higher column index.
pub fn top_k_indices(scores: &Array1<f64>, k: usize) -> Result<Vec<usize>, PipelineError> {
    if k == 0 || k > scores.len() {
        return Err(PipelineError::InvalidK {
            k,
            available: scores.len(),
        });
    }

    let mut selected: Vec<usize> = ranked_indices(scores).into_iter().take(k).collect();
    selected.sort_unstable();
    Ok(selected)
}

/// Select the k best features of a table according to a scoring function.
#[derive(Debug, Clone)]
pub struct SelectKBest {
    /// The number of top features to select.
    k: usize,
    score_func: ScoreFunction,
}

impl SelectKBest {
    pub fn new(k: usize, score_func: ScoreFunction) -> Self {
        SelectKBest { k, score_func }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Score every column of `table` against `y` and keep the best `k`.
    ///
    /// # Errors
    ///
    /// `InvalidK` when `k` is zero or larger than the number of columns,
    /// plus whatever the scoring function rejects.
    pub fn fit(&self, table: &FeatureTable, y: &Array1<i64>) -> Result<FittedSelector, PipelineError> {
        if self.k == 0 || self.k > table.ncols() {
            return Err(PipelineError::InvalidK {
                k: self.k,
                available: table.ncols(),
            });
        }

        let (scores, p_values) = match self.score_func {
            ScoreFunction::Chi2 => chi2(table.values(), y)?,
            ScoreFunction::FRegression => f_regression(table.values(), y)?,
        };

        let selected = top_k_indices(&scores, self.k)?;
        let names = selected.iter().map(|&i| table.names()[i].clone()).collect();

        Ok(FittedSelector {
            input_names: table.names().to_vec(),
            scores,
            p_values,
            selected,
            names,
        })
    }
}

/// Outcome of [`SelectKBest::fit`]: which columns survive, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedSelector {
    input_names: Vec<String>,
    scores: Array1<f64>,
    p_values: Array1<f64>,
    selected: Vec<usize>,
    names: Vec<String>,
}

impl FittedSelector {
    /// Names of the selected columns, in their original table order.
    ///
    /// This is the column order of every table `transform` returns, and so
    /// the order a model sees. It is not the score ranking: use
    /// [`FittedSelector::selected_by_score`] for the best-first listing.
    pub fn selected_names(&self) -> &[String] {
        &self.names
    }

    /// Names of the selected columns, highest score first.
    pub fn selected_by_score(&self) -> Vec<&str> {
        ranked_indices(&self.scores)
            .into_iter()
            .filter(|i| self.selected.binary_search(i).is_ok())
            .map(|i| self.input_names[i].as_str())
            .collect()
    }

    /// Positions of the selected columns in the fitted table.
    pub fn selected_indices(&self) -> &[usize] {
        &self.selected
    }

    pub fn scores(&self) -> &Array1<f64> {
        &self.scores
    }

    pub fn p_values(&self) -> &Array1<f64> {
        &self.p_values
    }

    /// `(name, score)` for every input column, best first.
    pub fn ranked_scores(&self) -> Vec<(&str, f64)> {
        ranked_indices(&self.scores)
            .into_iter()
            .map(|i| (self.input_names[i].as_str(), self.scores[i]))
            .collect()
    }

    /// Keep the selected columns of `table`, looked up by name.
    pub fn transform(&self, table: &FeatureTable) -> Result<FeatureTable, PipelineError> {
        table.select_columns(&self.names)
    }
}
