//! asd-classifiers: a small ASD screening pipeline.
//!
//! Reads a labelled training table and an unlabelled test table, reduces the
//! feature space (configured column drops, chi-square `SelectKBest`, optional
//! PCA), trains a decision tree or an AdaBoost ensemble and writes one
//! `ID,Predicted` row per test sample.
//!
//! Every learned transform follows the same shape: a parameter struct whose
//! `fit` returns an immutable `Fitted*` value, so test data can only ever be
//! transformed with parameters learned from training data.
pub mod config;
pub mod data_handling;
pub mod decomposition;
pub mod error;
pub mod feature_selection;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod reduction;
pub mod report;
pub mod stats;

pub use config::{BoostAlgorithm, ModelType, PipelineConfig, Preset, ReductionConfig};
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineOutput};
