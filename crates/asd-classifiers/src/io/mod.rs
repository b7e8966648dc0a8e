//! IO utilities for reading feature tables and writing predictions.

pub mod submission;
pub mod table;

pub use submission::{write_submission, Submission};
pub use table::{
    load_datasets, read_feature_table, read_feature_table_with_config, read_training_table,
    read_training_table_with_config, TableReaderConfig,
};
