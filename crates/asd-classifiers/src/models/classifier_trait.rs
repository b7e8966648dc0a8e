use std::fmt::Debug;

use ndarray::{Array1, Array2};

use crate::error::PipelineError;

/// An untrained model: hyper-parameters plus a `fit` that produces a
/// [`TrainedModel`]. Fitting never mutates the classifier, so the same
/// parameters can be fit again and give the same model.
pub trait Classifier {
    /// Fit on the whole of `x` / `y`. Labels may be any integers.
    fn fit(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<Box<dyn TrainedModel>, PipelineError>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// A fitted classifier, consumed only for prediction.
pub trait TrainedModel: Debug {
    /// One label per row of `x`, in row order.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, PipelineError>;

    /// Width of the matrix the model was fit on.
    fn n_features(&self) -> usize;

    /// Impurity-based importance per input column, summing to 1 when any
    /// split was made.
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    fn name(&self) -> &str {
        "model"
    }
}
