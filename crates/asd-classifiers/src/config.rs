use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::feature_selection::ScoreFunction;

/// Central configuration for a pipeline run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub train_data: String,
    pub test_data: String,
    pub output_file: String,
    pub reduction: ReductionConfig,
    pub model: ModelType,
    /// Optional HTML path for the correlation heatmap of the selected features.
    pub correlation_plot: Option<String>,
}

/// Feature reduction steps, applied in field order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReductionConfig {
    /// Columns removed before scoring. Every name must exist.
    pub drop_columns: Vec<String>,
    /// Remove columns that are constant on the training data.
    pub drop_constant_features: bool,
    pub score_function: ScoreFunction,
    pub k_best: usize,
    /// Columns removed after selection. Every name must have been selected.
    pub post_selection_drop: Vec<String>,
    /// Project the selected features onto this many principal components.
    pub pca_components: Option<usize>,
}

/// Boosting rule used by AdaBoost.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoostAlgorithm {
    /// Discrete boosting on predicted labels.
    #[serde(rename = "SAMME")]
    Samme,
    /// Real boosting on leaf class probabilities.
    #[default]
    #[serde(rename = "SAMME.R")]
    SammeR,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    AdaBoost {
        n_estimators: usize,
        max_depth: usize,
        learning_rate: f64,
        seed: u64,
        #[serde(default)]
        algorithm: BoostAlgorithm,
    },
    DecisionTree {
        max_depth: Option<usize>,
        min_samples_split: usize,
        min_samples_leaf: usize,
        seed: u64,
    },
}

/// Pipelines reproduced from the two historical screening scripts.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// SelectKBest(50) → drop correlated columns → AdaBoost(10, SAMME.R).
    #[default]
    CorrelationElimination,
    /// Drop constant columns → SelectKBest(100) → PCA(80) → decision tree.
    ConstantElimination,
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::AdaBoost {
            n_estimators: 10,
            max_depth: 1,
            learning_rate: 1.0,
            seed: 0,
            algorithm: BoostAlgorithm::SammeR,
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::AdaBoost { .. } => "adaboost",
            ModelType::DecisionTree { .. } => "decision_tree",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "adaboost" | "adaboost_samme_r" => Ok(ModelType::default()),
            "adaboost_samme" => Ok(ModelType::AdaBoost {
                n_estimators: 10,
                max_depth: 1,
                learning_rate: 1.0,
                seed: 0,
                algorithm: BoostAlgorithm::Samme,
            }),
            "decision_tree" | "tree" => Ok(ModelType::DecisionTree {
                max_depth: None,
                min_samples_split: 2,
                min_samples_leaf: 1,
                seed: 25,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: adaboost, adaboost_samme, decision_tree",
                s
            )),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "correlation-elimination" => Ok(Preset::CorrelationElimination),
            "constant-elimination" => Ok(Preset::ConstantElimination),
            _ => Err(format!(
                "Unknown preset: {}. Expected correlation-elimination or constant-elimination",
                s
            )),
        }
    }
}

impl Default for ReductionConfig {
    fn default() -> Self {
        PipelineConfig::preset(Preset::default()).reduction
    }
}

impl PipelineConfig {
    pub fn preset(preset: Preset) -> Self {
        let (reduction, model) = match preset {
            Preset::CorrelationElimination => (
                ReductionConfig {
                    drop_columns: Vec::new(),
                    drop_constant_features: false,
                    score_function: ScoreFunction::Chi2,
                    k_best: 50,
                    post_selection_drop: to_strings(&["X584", "X579", "X404", "X528", "X318"]),
                    pca_components: None,
                },
                ModelType::default(),
            ),
            Preset::ConstantElimination => (
                ReductionConfig {
                    drop_columns: to_strings(&["X3", "X31", "X32", "X127", "X128", "X590"]),
                    drop_constant_features: false,
                    score_function: ScoreFunction::Chi2,
                    k_best: 100,
                    post_selection_drop: Vec::new(),
                    pca_components: Some(80),
                },
                ModelType::DecisionTree {
                    max_depth: None,
                    min_samples_split: 2,
                    min_samples_leaf: 1,
                    seed: 25,
                },
            ),
        };

        PipelineConfig {
            train_data: "train.csv".to_string(),
            test_data: "test.csv".to_string(),
            output_file: "submission.csv".to_string(),
            reduction,
            model,
            correlation_plot: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::preset(Preset::default())
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
