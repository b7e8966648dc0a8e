//! End-to-end driver: load, reduce, fit, predict, write.

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::data_handling::Datasets;
use crate::error::PipelineError;
use crate::io::{load_datasets, write_submission, Submission};
use crate::models::factory::build_model;
use crate::reduction::{FeatureReducer, FittedReducer};
use crate::report::plots::write_correlation_heatmap;
use crate::stats::accuracy;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub submission: Submission,
    pub reducer: FittedReducer,
    pub training_accuracy: f64,
}

impl PipelineOutput {
    /// Feature columns the model was trained on (before PCA, if any).
    pub fn selected_features(&self) -> &[String] {
        self.reducer.feature_names()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read the configured input files, then behave as [`Pipeline::run_on`].
    pub fn run(&self) -> Result<PipelineOutput> {
        let datasets = load_datasets(&self.config.train_data, &self.config.test_data)?;
        self.run_on(datasets)
    }

    /// Fit and predict on already loaded data, then write the submission
    /// and, when configured, the correlation heatmap.
    ///
    /// The heatmap covers every column the selector chose, including those
    /// the post-selection drop removes afterwards. It is written after the
    /// submission, so a bad plot path never costs the predictions.
    pub fn run_on(&self, datasets: Datasets) -> Result<PipelineOutput> {
        let output = self.fit_predict(&datasets)?;
        write_submission(&self.config.output_file, &output.submission)?;

        if let Some(plot_path) = &self.config.correlation_plot {
            let selected = output.reducer.selected_table(&datasets.train.features)?;
            write_correlation_heatmap(selected.values(), selected.names(), plot_path)
                .with_context(|| format!("Failed to write correlation heatmap: {}", plot_path))?;
        }

        Ok(output)
    }

    /// The in-memory part of a run: nothing is read or written.
    pub fn fit_predict(&self, datasets: &Datasets) -> Result<PipelineOutput> {
        datasets.log_input_data_summary();
        let train = &datasets.train;
        for table in [&train.features, &datasets.test] {
            if let Some((row, column)) = table.find_non_finite() {
                let name = &table.names()[column];
                return Err(PipelineError::NonFiniteValue { row, column })
                    .with_context(|| format!("Column '{}' holds a missing or infinite value", name));
            }
        }

        let reducer = FeatureReducer::new(self.config.reduction.clone())
            .fit(&train.features, &train.labels)
            .context("Feature reduction failed")?;

        let x_train = reducer.transform(&train.features)?;
        let x_test = reducer.transform(&datasets.test)?;
        log::info!(
            "Reduced matrices: train {}x{}, test {}x{}",
            x_train.nrows(),
            x_train.ncols(),
            x_test.nrows(),
            x_test.ncols()
        );

        let classifier = build_model(&self.config.model);
        log::info!("Training {} model", classifier.name());
        let model = classifier
            .fit(&x_train, &train.labels)
            .with_context(|| format!("Failed to train {} model", classifier.name()))?;

        let training_accuracy = accuracy(&train.labels, &model.predict(&x_train)?);
        log::info!("Training accuracy: {:.4}", training_accuracy);

        let predictions = model.predict(&x_test)?;
        Ok(PipelineOutput {
            submission: Submission::from_predictions(&predictions),
            reducer,
            training_accuracy,
        })
    }
}
