use std::collections::BTreeSet;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Mapping between arbitrary integer labels and dense class indices.
///
/// Classes are kept sorted, so index 0 is always the smallest label.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClassEncoding {
    classes: Vec<i64>,
}

impl ClassEncoding {
    pub fn fit(y: &Array1<i64>) -> Self {
        let classes: BTreeSet<i64> = y.iter().copied().collect();
        ClassEncoding {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Dense index of every label. Labels unseen at fit time are an error.
    pub fn encode(&self, y: &Array1<i64>) -> Result<Vec<usize>, PipelineError> {
        y.iter()
            .map(|label| {
                self.classes.binary_search(label).map_err(|_| {
                    PipelineError::InvalidParameter(format!("label {} was not seen during fit", label))
                })
            })
            .collect()
    }

    pub fn decode(&self, idx: &[usize]) -> Array1<i64> {
        idx.iter().map(|&i| self.classes[i]).collect()
    }
}

/// Shared checks for model training input.
pub fn validate_training_input(x: &Array2<f64>, y: &Array1<i64>) -> Result<(), PipelineError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(PipelineError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: format!("{} labels", x.nrows()),
            got: format!("{} labels", y.len()),
        });
    }
    check_finite(x)
}

/// Shared checks for prediction input against the training width.
pub fn validate_prediction_input(x: &Array2<f64>, n_features: usize) -> Result<(), PipelineError> {
    if x.ncols() != n_features {
        return Err(PipelineError::ShapeMismatch {
            expected: format!("{} features", n_features),
            got: format!("{} features", x.ncols()),
        });
    }
    check_finite(x)
}

fn check_finite(x: &Array2<f64>) -> Result<(), PipelineError> {
    match x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, column), _)) => Err(PipelineError::NonFiniteValue { row, column }),
        None => Ok(()),
    }
}

/// Index of the largest value; the first one wins on ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn encoding_sorts_classes() {
        let enc = ClassEncoding::fit(&array![5, -1, 5, 2]);
        assert_eq!(enc.classes(), &[-1, 2, 5]);
        assert_eq!(enc.encode(&array![2, 5, -1]).unwrap(), vec![1, 2, 0]);
        assert_eq!(enc.decode(&[0, 2]).to_vec(), vec![-1, 5]);
        assert!(enc.encode(&array![7]).is_err());
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), 1);
        assert_eq!(argmax(&[0.0]), 0);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let x = array![[1.0, f64::NAN]];
        assert_eq!(
            validate_training_input(&x, &array![0]).unwrap_err(),
            PipelineError::NonFiniteValue { row: 0, column: 1 }
        );
    }
}
