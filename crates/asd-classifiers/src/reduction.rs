//! Feature reduction: the fixed sequence of column drops, chi-square
//! selection and optional PCA that turns a raw feature table into the matrix
//! a model is trained on.
//!
//! [`FeatureReducer::fit`] sees the training table only. The returned
//! [`FittedReducer`] is immutable and applies exactly the same steps to any
//! table with the training columns.

use ndarray::{Array1, Array2};

use crate::config::ReductionConfig;
use crate::data_handling::FeatureTable;
use crate::decomposition::{FittedPca, Pca};
use crate::error::PipelineError;
use crate::feature_selection::{FittedSelector, SelectKBest};
use crate::preprocessing::{fit_constant_filter, ConstantFeatureFilter};

#[derive(Debug, Clone)]
pub struct FeatureReducer {
    config: ReductionConfig,
}

impl FeatureReducer {
    pub fn new(config: ReductionConfig) -> Self {
        FeatureReducer { config }
    }

    pub fn fit(&self, train: &FeatureTable, labels: &Array1<i64>) -> Result<FittedReducer, PipelineError> {
        let cfg = &self.config;
        if train.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if labels.len() != train.nrows() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} labels", train.nrows()),
                got: format!("{} labels", labels.len()),
            });
        }

        let mut table = train.drop_columns(&cfg.drop_columns)?;
        if !cfg.drop_columns.is_empty() {
            log::info!(
                "Dropped {} configured columns, {} remain",
                cfg.drop_columns.len(),
                table.ncols()
            );
        }

        let constant_filter = if cfg.drop_constant_features {
            let filter = fit_constant_filter(&table)?;
            log::info!(
                "Dropped {} constant columns, {} remain",
                filter.dropped.len(),
                filter.keep.len()
            );
            table = filter.transform(&table)?;
            Some(filter)
        } else {
            None
        };

        let selector = SelectKBest::new(cfg.k_best, cfg.score_function).fit(&table, labels)?;
        log::info!(
            "Selected {} of {} features (best first): {}",
            selector.selected_names().len(),
            table.ncols(),
            selector.selected_by_score().join(", ")
        );
        for (name, score) in selector.ranked_scores().iter().take(10) {
            log::debug!("  {}: {:.4}", name, score);
        }

        let selected = selector.transform(&table)?;
        let mut final_names = selected.names().to_vec();
        for name in &cfg.post_selection_drop {
            match final_names.iter().position(|n| n == name) {
                Some(i) => {
                    final_names.remove(i);
                }
                None => return Err(PipelineError::UnknownColumn(name.clone())),
            }
        }
        if final_names.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "post-selection drop list removes every selected feature".to_string(),
            ));
        }
        if !cfg.post_selection_drop.is_empty() {
            log::info!(
                "Dropped {} selected columns, {} remain",
                cfg.post_selection_drop.len(),
                final_names.len()
            );
        }

        let reduced = selected.select_columns(&final_names)?;

        let pca = match cfg.pca_components {
            Some(n) => {
                let fitted = Pca::new(n).fit(reduced.values())?;
                log::info!(
                    "PCA: {} components explain {:.2}% of the variance",
                    fitted.n_components(),
                    fitted.explained_variance_ratio().sum() * 100.0
                );
                Some(fitted)
            }
            None => None,
        };

        Ok(FittedReducer {
            drop_columns: cfg.drop_columns.clone(),
            constant_filter,
            selector,
            feature_names: final_names,
            pca,
        })
    }
}

/// Every learned parameter of the reduction steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedReducer {
    drop_columns: Vec<String>,
    constant_filter: Option<ConstantFeatureFilter>,
    selector: FittedSelector,
    /// Selected columns left after the post-selection drop, in table order.
    feature_names: Vec<String>,
    pca: Option<FittedPca>,
}

impl FittedReducer {
    pub fn selector(&self) -> &FittedSelector {
        &self.selector
    }

    pub fn constant_filter(&self) -> Option<&ConstantFeatureFilter> {
        self.constant_filter.as_ref()
    }

    pub fn pca(&self) -> Option<&FittedPca> {
        self.pca.as_ref()
    }

    /// Feature columns fed to the model (or to PCA when enabled).
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Width of the matrix produced by `transform`.
    pub fn output_width(&self) -> usize {
        self.pca
            .as_ref()
            .map_or(self.feature_names.len(), FittedPca::n_components)
    }

    fn prefilter(&self, table: &FeatureTable) -> Result<FeatureTable, PipelineError> {
        let table = table.drop_columns(&self.drop_columns)?;
        match &self.constant_filter {
            Some(filter) => filter.transform(&table),
            None => Ok(table),
        }
    }

    /// All `k` columns chosen by the selector, before the post-selection
    /// drop removes any of them.
    pub fn selected_table(&self, table: &FeatureTable) -> Result<FeatureTable, PipelineError> {
        self.selector.transform(&self.prefilter(table)?)
    }

    /// Feature columns of `table` the model is trained on, before any
    /// projection.
    pub fn select(&self, table: &FeatureTable) -> Result<FeatureTable, PipelineError> {
        self.prefilter(table)?.select_columns(&self.feature_names)
    }

    /// Apply the fitted steps to `table` without refitting anything.
    pub fn transform(&self, table: &FeatureTable) -> Result<Array2<f64>, PipelineError> {
        let selected = self.select(table)?;
        match &self.pca {
            Some(pca) => pca.transform(selected.values()),
            None => Ok(selected.values().clone()),
        }
    }
}
