//! Multi-class AdaBoost over shallow decision trees.
//!
//! Two boosting rules are supported. [`BoostAlgorithm::Samme`] weighs each
//! tree by its error and lets trees vote with their predicted labels.
//! [`BoostAlgorithm::SammeR`] uses the leaf class probabilities instead:
//! every tree contributes `(K - 1) * (ln p_k - mean_j ln p_j)` to class `k`.

use ndarray::{Array1, Array2};

use crate::config::BoostAlgorithm;
use crate::error::PipelineError;
use crate::models::classifier_trait::{Classifier, TrainedModel};
use crate::models::tree::{Tree, TreeParams};
use crate::models::utils::{argmax, validate_prediction_input, validate_training_input, ClassEncoding};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaBoostParams {
    pub n_estimators: usize,
    /// Depth of every weak learner; 1 gives decision stumps.
    pub max_depth: usize,
    pub learning_rate: f64,
    pub seed: u64,
    pub algorithm: BoostAlgorithm,
}

impl Default for AdaBoostParams {
    fn default() -> Self {
        AdaBoostParams {
            n_estimators: 50,
            max_depth: 1,
            learning_rate: 1.0,
            seed: 0,
            algorithm: BoostAlgorithm::SammeR,
        }
    }
}

/// Smallest probability fed to `ln`.
const PROBA_FLOOR: f64 = f64::EPSILON;

/// Per-class SAMME.R contribution of one tree for every row.
fn real_votes(proba: &Array2<f64>) -> Array2<f64> {
    let k = proba.ncols() as f64;
    let mut log_proba = proba.mapv(|p| p.max(PROBA_FLOOR).ln());
    for mut row in log_proba.rows_mut() {
        let mean = row.sum() / k;
        row.mapv_inplace(|v| (k - 1.0) * (v - mean));
    }
    log_proba
}

#[derive(Debug, Clone)]
pub struct AdaBoostClassifier {
    params: AdaBoostParams,
}

impl AdaBoostClassifier {
    pub fn new(params: AdaBoostParams) -> Self {
        AdaBoostClassifier { params }
    }

    pub fn fit_boosted(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<FittedAdaBoost, PipelineError> {
        let p = self.params;
        if p.n_estimators == 0 {
            return Err(PipelineError::InvalidParameter("n_estimators must be at least 1".into()));
        }
        if !(p.learning_rate.is_finite() && p.learning_rate > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                p.learning_rate
            )));
        }
        validate_training_input(x, y)?;

        let encoding = ClassEncoding::fit(y);
        let n_classes = encoding.n_classes();
        if n_classes < 2 {
            return Err(PipelineError::SingleClass(n_classes));
        }
        let encoded = encoding.encode(y)?;

        let (estimators, estimator_weights) = match p.algorithm {
            BoostAlgorithm::Samme => self.boost_discrete(x, &encoded, n_classes)?,
            BoostAlgorithm::SammeR => self.boost_real(x, &encoded, n_classes)?,
        };

        log::debug!("AdaBoost kept {} of {} estimators", estimators.len(), p.n_estimators);

        Ok(FittedAdaBoost {
            estimators,
            estimator_weights,
            algorithm: p.algorithm,
            encoding,
            n_features: x.ncols(),
        })
    }

    fn weak_learner(&self, round: usize) -> TreeParams {
        TreeParams {
            max_depth: Some(self.params.max_depth),
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: self.params.seed.wrapping_add(round as u64),
        }
    }

    /// SAMME: label votes weighted by `lr * (ln((1 - err) / err) + ln(K - 1))`.
    fn boost_discrete(
        &self,
        x: &Array2<f64>,
        encoded: &[usize],
        n_classes: usize,
    ) -> Result<(Vec<Tree>, Vec<f64>), PipelineError> {
        let p = self.params;
        let n = x.nrows();
        let mut weights = vec![1.0 / n as f64; n];
        let mut estimators = Vec::with_capacity(p.n_estimators);
        let mut estimator_weights = Vec::with_capacity(p.n_estimators);
        let chance_error = 1.0 - 1.0 / n_classes as f64;

        for round in 0..p.n_estimators {
            let tree = Tree::grow(x, encoded, &weights, n_classes, self.weak_learner(round))?;
            let predicted = tree.predict_encoded(x);

            let error: f64 = predicted
                .iter()
                .zip(encoded)
                .zip(&weights)
                .filter(|((pred, truth), _)| pred != truth)
                .map(|(_, w)| w)
                .sum();

            if error <= 0.0 {
                log::debug!("AdaBoost round {}: perfect fit, stopping early", round);
                estimators.push(tree);
                estimator_weights.push(1.0);
                break;
            }

            if error >= chance_error {
                if estimators.is_empty() {
                    return Err(PipelineError::InvalidParameter(format!(
                        "first weak learner is no better than chance (error {:.4})",
                        error
                    )));
                }
                log::debug!("AdaBoost round {}: error {:.4} at chance level, stopping", round, error);
                break;
            }

            let alpha = p.learning_rate * (((1.0 - error) / error).ln() + ((n_classes - 1) as f64).ln());
            log::debug!("AdaBoost round {}: error {:.4}, alpha {:.4}", round, error, alpha);

            if round + 1 < p.n_estimators {
                let boost = alpha.exp();
                for ((w, pred), truth) in weights.iter_mut().zip(&predicted).zip(encoded) {
                    if pred != truth {
                        *w *= boost;
                    }
                }
                let total: f64 = weights.iter().sum();
                if !(total.is_finite() && total > 0.0) {
                    estimators.push(tree);
                    estimator_weights.push(alpha);
                    break;
                }
                for w in weights.iter_mut() {
                    *w /= total;
                }
            }

            estimators.push(tree);
            estimator_weights.push(alpha);
        }

        Ok((estimators, estimator_weights))
    }

    /// SAMME.R: every kept tree has weight 1; sample weights grow with the
    /// log-probability mass a tree puts on the wrong classes.
    fn boost_real(
        &self,
        x: &Array2<f64>,
        encoded: &[usize],
        n_classes: usize,
    ) -> Result<(Vec<Tree>, Vec<f64>), PipelineError> {
        let p = self.params;
        let n = x.nrows();
        let k = n_classes as f64;
        let mut weights = vec![1.0 / n as f64; n];
        let mut estimators = Vec::with_capacity(p.n_estimators);

        for round in 0..p.n_estimators {
            let tree = Tree::grow(x, encoded, &weights, n_classes, self.weak_learner(round))?;
            let proba = tree.predict_proba(x);

            let error: f64 = tree
                .predict_encoded(x)
                .iter()
                .zip(encoded)
                .zip(&weights)
                .filter(|((pred, truth), _)| pred != truth)
                .map(|(_, w)| w)
                .sum();
            estimators.push(tree);

            if error <= 0.0 {
                log::debug!("AdaBoost round {}: perfect fit, stopping early", round);
                break;
            }
            log::debug!("AdaBoost round {}: error {:.4}", round, error);

            if round + 1 == p.n_estimators {
                break;
            }

            // Coding: 1 for the true class, -1 / (K - 1) for the others.
            let off = -1.0 / (k - 1.0);
            for ((w, row), &truth) in weights.iter_mut().zip(proba.rows()).zip(encoded) {
                let agreement: f64 = row
                    .iter()
                    .enumerate()
                    .map(|(class, &pr)| {
                        let code = if class == truth { 1.0 } else { off };
                        code * pr.max(PROBA_FLOOR).ln()
                    })
                    .sum();
                let factor = -p.learning_rate * ((k - 1.0) / k) * agreement;
                if *w > 0.0 || factor < 0.0 {
                    *w *= factor.exp();
                }
            }

            let total: f64 = weights.iter().sum();
            if !(total.is_finite() && total > 0.0) {
                break;
            }
            for w in weights.iter_mut() {
                *w /= total;
            }
        }

        let estimator_weights = vec![1.0; estimators.len()];
        Ok((estimators, estimator_weights))
    }
}

impl Classifier for AdaBoostClassifier {
    fn fit(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<Box<dyn TrainedModel>, PipelineError> {
        Ok(Box::new(self.fit_boosted(x, y)?))
    }

    fn name(&self) -> &str {
        "adaboost"
    }
}

/// A fitted ensemble: weak learners with their vote weights.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedAdaBoost {
    estimators: Vec<Tree>,
    estimator_weights: Vec<f64>,
    algorithm: BoostAlgorithm,
    encoding: ClassEncoding,
    n_features: usize,
}

impl FittedAdaBoost {
    pub fn n_estimators(&self) -> usize {
        self.estimators.len()
    }

    pub fn estimator_weights(&self) -> &[f64] {
        &self.estimator_weights
    }

    pub fn algorithm(&self) -> BoostAlgorithm {
        self.algorithm
    }

    /// Summed class scores per row; the prediction is the arg max.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        validate_prediction_input(x, self.n_features)?;
        let mut scores = Array2::<f64>::zeros((x.nrows(), self.encoding.n_classes()));
        for (tree, &alpha) in self.estimators.iter().zip(&self.estimator_weights) {
            match self.algorithm {
                BoostAlgorithm::Samme => {
                    for (row, class) in tree.predict_encoded(x).into_iter().enumerate() {
                        scores[(row, class)] += alpha;
                    }
                }
                BoostAlgorithm::SammeR => scores += &real_votes(&tree.predict_proba(x)),
            }
        }
        Ok(scores)
    }
}

impl TrainedModel for FittedAdaBoost {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, PipelineError> {
        let scores = self.decision_function(x)?;
        let winners: Vec<usize> = scores
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()))
            .collect();
        Ok(self.encoding.decode(&winners))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        let total: f64 = self.estimator_weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut importances = Array1::<f64>::zeros(self.n_features);
        for (tree, &alpha) in self.estimators.iter().zip(&self.estimator_weights) {
            importances.scaled_add(alpha / total, tree.feature_importances());
        }
        Some(importances)
    }

    fn name(&self) -> &str {
        "adaboost"
    }
}
