//! Principal component analysis (PCA).
//!
//! Components are the leading eigenvectors of the sample covariance matrix,
//! computed by the dense symmetric solver in `linfa-linalg`. The fitted
//! projection only ever sees the matrix passed to [`Pca::fit`].

use linfa_linalg::eigh::Eigh;
use ndarray::{Array1, Array2, Axis};

use crate::error::PipelineError;

/// PCA parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pca {
    n_components: usize,
}

impl Pca {
    pub fn new(n_components: usize) -> Self {
        Pca { n_components }
    }

    /// Fit the projection to `x` (rows are samples).
    ///
    /// # Errors
    ///
    /// * `InvalidComponents` when `n_components` is zero or exceeds
    ///   `min(n_samples, n_features)`.
    /// * `InvalidParameter` when fewer than two samples are given.
    /// * `Decomposition` when the eigensolver fails.
    pub fn fit(&self, x: &Array2<f64>) -> Result<FittedPca, PipelineError> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if self.n_components == 0 || self.n_components > n_samples.min(n_features) {
            return Err(PipelineError::InvalidComponents {
                requested: self.n_components,
                n_samples,
                n_features,
            });
        }
        if n_samples < 2 {
            return Err(PipelineError::InvalidParameter(
                "PCA needs at least two samples".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(PipelineError::EmptyDataset)?;
        let centered = x - &mean;
        let covariance = centered.t().dot(&centered) / (n_samples as f64 - 1.0);

        let (eigenvalues, eigenvectors) = covariance
            .eigh()
            .map_err(|e| PipelineError::Decomposition(e.to_string()))?;

        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&i, &j| eigenvalues[j].total_cmp(&eigenvalues[i]).then(i.cmp(&j)));

        let total_variance: f64 = eigenvalues.iter().map(|&v| v.max(0.0)).sum();

        let mut components = Array2::<f64>::zeros((self.n_components, n_features));
        let mut explained_variance = Array1::<f64>::zeros(self.n_components);
        for (row, &idx) in order.iter().take(self.n_components).enumerate() {
            let mut component = eigenvectors.column(idx).to_owned();
            flip_sign(&mut component);
            components.row_mut(row).assign(&component);
            explained_variance[row] = eigenvalues[idx].max(0.0);
        }

        let explained_variance_ratio = if total_variance > 0.0 {
            &explained_variance / total_variance
        } else {
            Array1::zeros(self.n_components)
        };

        Ok(FittedPca {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }
}

/// A fitted, immutable PCA projection.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPca {
    /// Mean of the training data. Shape: (n_features)
    mean: Array1<f64>,
    /// Principal axes, one per row. Shape: (n_components, n_features)
    components: Array2<f64>,
    /// Variance explained by each component. Shape: (n_components)
    explained_variance: Array1<f64>,
    explained_variance_ratio: Array1<f64>,
}

impl FittedPca {
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn explained_variance(&self) -> &Array1<f64> {
        &self.explained_variance
    }

    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Project `x` onto the fitted components.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} columns", self.mean.len()),
                got: format!("{} columns", x.ncols()),
            });
        }
        Ok((x - &self.mean).dot(&self.components.t()))
    }
}

/// Make the largest-magnitude loading of a component positive.
fn flip_sign(component: &mut Array1<f64>) {
    let mut pivot = 0.0f64;
    for &v in component.iter() {
        if v.abs() > pivot.abs() {
            pivot = v;
        }
    }
    if pivot < 0.0 {
        component.mapv_inplace(|v| -v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn components_are_covariance_eigenvectors() {
        // Covariance of these rows is [[5/3, 4/3], [4/3, 5/3]]:
        // eigenpairs (3, [1, 1]/sqrt 2) and (1/3, [1, -1]/sqrt 2).
        let x = array![[0.0, 0.0], [1.0, 2.0], [2.0, 1.0], [3.0, 3.0]];
        let pca = Pca::new(2).fit(&x).unwrap();
        let ev = pca.explained_variance();
        assert!((ev[0] - 3.0).abs() < 1e-10, "{}", ev[0]);
        assert!((ev[1] - 1.0 / 3.0).abs() < 1e-10, "{}", ev[1]);

        let h = std::f64::consts::FRAC_1_SQRT_2;
        let c = pca.components();
        assert!((c[(0, 0)] - h).abs() < 1e-10 && (c[(0, 1)] - h).abs() < 1e-10);
        assert!((c[(1, 0)].abs() - h).abs() < 1e-10);
        assert!((c[(1, 0)] + c[(1, 1)]).abs() < 1e-10);
        assert!((pca.explained_variance_ratio().sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn refitting_gives_identical_components() {
        let x = array![
            [2.0, 0.0, 1.0, 4.0],
            [1.0, 3.0, 0.5, 2.0],
            [0.0, 1.0, 2.0, 1.0],
            [3.0, 2.0, 1.5, 0.0],
        ];
        let a = Pca::new(2).fit(&x).unwrap();
        let b = Pca::new(2).fit(&x).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn first_component_follows_dominant_direction() {
        // Points spread along y = x with a little noise orthogonal to it.
        let x = array![
            [1.0, 1.1],
            [2.0, 1.9],
            [3.0, 3.2],
            [4.0, 3.8],
            [5.0, 5.1],
        ];
        let pca = Pca::new(1).fit(&x).unwrap();
        let c = pca.components().row(0);
        assert!(c[0] > 0.0 && c[1] > 0.0);
        assert!((c[0] - c[1]).abs() < 0.1);
        assert!(pca.explained_variance_ratio()[0] > 0.95);
    }

    #[test]
    fn components_are_orthonormal() {
        let x = array![
            [2.0, 0.0, 1.0, 4.0],
            [1.0, 3.0, 0.5, 2.0],
            [0.0, 1.0, 2.0, 1.0],
            [3.0, 2.0, 1.5, 0.0],
            [1.5, 0.5, 3.0, 2.5],
        ];
        let pca = Pca::new(3).fit(&x).unwrap();
        let gram = pca.components().dot(&pca.components().t());
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[(i, j)] - expected).abs() < 1e-9);
            }
        }
        let ev = pca.explained_variance();
        assert!(ev[0] >= ev[1] && ev[1] >= ev[2]);
    }

    #[test]
    fn transform_centres_training_data() {
        let x = array![[1.0, 2.0], [3.0, 6.0], [5.0, 7.0], [7.0, 13.0]];
        let pca = Pca::new(2).fit(&x).unwrap();
        let projected = pca.transform(&x).unwrap();
        let means = projected.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-10));
        // Projected variance matches the explained variance.
        let var0 = projected.column(0).mapv(|v| v * v).sum() / 3.0;
        assert!((var0 - pca.explained_variance()[0]).abs() < 1e-8);
    }

    #[test]
    fn too_many_components_errors() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(
            Pca::new(3).fit(&x).unwrap_err(),
            PipelineError::InvalidComponents {
                requested: 3,
                n_samples: 2,
                n_features: 3
            }
        );
        assert!(Pca::new(0).fit(&x).is_err());
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let x = array![[1.0, 2.0], [3.0, 5.0], [4.0, 4.0]];
        let pca = Pca::new(1).fit(&x).unwrap();
        assert!(pca.transform(&array![[1.0, 2.0, 3.0]]).is_err());
    }
}
