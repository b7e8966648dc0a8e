use thiserror::Error;

/// Failures raised by the reduction and model stages of the pipeline.
///
/// IO and parsing problems are reported through `anyhow` with file/row
/// context; this enum covers shape and parameter violations that the
/// pipeline must refuse rather than silently work around.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("cannot select k={k} features: {available} available")]
    InvalidK { k: usize, available: usize },

    #[error("column '{0}' not found")]
    UnknownColumn(String),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("feature columns differ between tables (missing: {missing:?}, unexpected: {unexpected:?})")]
    ColumnMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("chi-square scoring requires non-negative features; column {column} holds {value}")]
    NegativeValues { column: usize, value: f64 },

    #[error("cannot extract {requested} principal components from a {n_samples}x{n_features} matrix")]
    InvalidComponents {
        requested: usize,
        n_samples: usize,
        n_features: usize,
    },

    #[error("eigen-decomposition failed: {0}")]
    Decomposition(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("at least two classes are required, found {0}")]
    SingleClass(usize),

    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
