use crate::config::ModelType;
use crate::models::adaboost::{AdaBoostClassifier, AdaBoostParams};
use crate::models::classifier_trait::Classifier;
use crate::models::tree::{DecisionTreeClassifier, TreeParams};

/// Build a boxed classifier from a `ModelType`.
pub fn build_model(model_type: &ModelType) -> Box<dyn Classifier> {
    match *model_type {
        ModelType::AdaBoost {
            n_estimators,
            max_depth,
            learning_rate,
            seed,
            algorithm,
        } => Box::new(AdaBoostClassifier::new(AdaBoostParams {
            n_estimators,
            max_depth,
            learning_rate,
            seed,
            algorithm,
        })),

        ModelType::DecisionTree {
            max_depth,
            min_samples_split,
            min_samples_leaf,
            seed,
        } => Box::new(DecisionTreeClassifier::new(TreeParams {
            max_depth,
            min_samples_split,
            min_samples_leaf,
            seed,
        })),
    }
}
