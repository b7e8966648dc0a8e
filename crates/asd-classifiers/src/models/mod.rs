pub mod adaboost;
pub mod tree;
pub mod utils;

pub mod classifier_trait;
pub mod factory;
