use ndarray::{Array1, Array2, Axis};

/// Absolute Pearson correlation between every pair of columns.
///
/// Constant columns have no defined correlation; their off-diagonal entries
/// are reported as 0 and their diagonal as 1.
///
/// # Arguments
///
/// * `x` - A 2D array with samples as rows and features as columns.
///
/// # Returns
///
/// A symmetric `n_features x n_features` matrix with values in `[0, 1]`.
pub fn correlation_matrix(x: &Array2<f64>) -> Array2<f64> {
    let n_features = x.ncols();
    let mut corr = Array2::<f64>::eye(n_features);
    let Some(mean) = x.mean_axis(Axis(0)) else {
        return corr;
    };
    let centered = x - &mean;
    let norms: Array1<f64> = centered
        .axis_iter(Axis(1))
        .map(|col| col.dot(&col).sqrt())
        .collect();

    for i in 0..n_features {
        for j in (i + 1)..n_features {
            let denom = norms[i] * norms[j];
            let r = if denom > 0.0 {
                (centered.column(i).dot(&centered.column(j)) / denom).abs().min(1.0)
            } else {
                0.0
            };
            corr[(i, j)] = r;
            corr[(j, i)] = r;
        }
    }
    corr
}

/// Pairs of columns whose absolute correlation is at least `threshold`,
/// strongest first.
pub fn correlated_pairs(corr: &Array2<f64>, threshold: f64) -> Vec<(usize, usize, f64)> {
    let mut pairs = Vec::new();
    for i in 0..corr.nrows() {
        for j in (i + 1)..corr.ncols() {
            if corr[(i, j)] >= threshold {
                pairs.push((i, j, corr[(i, j)]));
            }
        }
    }
    pairs.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));
    pairs
}

/// Fraction of predictions equal to the truth. Empty input gives 0.
pub fn accuracy(truth: &Array1<i64>, predicted: &Array1<i64>) -> f64 {
    if truth.is_empty() || truth.len() != predicted.len() {
        return 0.0;
    }
    let hits = truth.iter().zip(predicted.iter()).filter(|(a, b)| a == b).count();
    hits as f64 / truth.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_correlation_matrix() {
        let x = array![[1.0, 2.0, 3.0, 5.0], [2.0, 4.0, 1.0, 5.0], [3.0, 6.0, 2.0, 5.0]];
        let corr = correlation_matrix(&x);
        assert_eq!(corr.dim(), (4, 4));
        assert!((corr[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((corr[(0, 2)] - 0.5).abs() < 1e-12);
        assert_eq!(corr[(0, 3)], 0.0);
        assert_eq!(corr[(3, 3)], 1.0);
        assert_eq!(corr[(2, 0)], corr[(0, 2)]);
    }

    #[test]
    fn test_correlated_pairs() {
        let corr = array![[1.0, 0.95, 0.2], [0.95, 1.0, 0.99], [0.2, 0.99, 1.0]];
        let pairs = correlated_pairs(&corr, 0.9);
        assert_eq!(pairs.iter().map(|p| (p.0, p.1)).collect::<Vec<_>>(), vec![(1, 2), (0, 1)]);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&array![1, 0, 1, 1], &array![1, 1, 1, 0]), 0.5);
        assert_eq!(accuracy(&Array1::zeros(0), &Array1::zeros(0)), 0.0);
    }
}
