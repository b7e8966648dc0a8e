//! Feature selection utilities.
//!
//! Univariate selection routines (a la scikit-learn) for scoring and
//! ranking features against the class label.
pub mod univariate_selection;

pub use univariate_selection::{FittedSelector, ScoreFunction, SelectKBest};
