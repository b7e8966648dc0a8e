use anyhow::{Context, Result};
use asd_classifiers::config::{PipelineConfig, Preset};
use clap::ArgMatches;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::util::{validate_output_extension, validate_tsv_or_csv_file};

/// Pipeline configuration resolved from an optional JSON file plus CLI overrides.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pipeline: PipelineConfig,
    /// `None` when the configuration came from a preset.
    pub config_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let config_path = matches.get_one::<PathBuf>("config").cloned();

        let mut config = match &config_path {
            Some(path) => load_pipeline_config(path)?,
            None => {
                let preset = match matches.get_one::<String>("preset") {
                    Some(name) => Preset::from_str(name).map_err(anyhow::Error::msg)?,
                    None => Preset::default(),
                };
                PipelineConfig::preset(preset)
            }
        };

        // Apply CLI overrides
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        if let Some(test_data) = matches.get_one::<String>("test_data") {
            config.test_data = test_data.clone();
        }
        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }
        if let Some(plot) = matches.get_one::<String>("correlation_plot") {
            config.correlation_plot = Some(plot.clone());
        }

        Ok(RunConfig {
            pipeline: config,
            config_path,
        })
    }

    /// Check input files and output extensions before any work is done.
    pub fn validate(&self) -> Result<()> {
        validate_tsv_or_csv_file(&self.pipeline.train_data)?;
        validate_tsv_or_csv_file(&self.pipeline.test_data)?;
        validate_output_extension(&self.pipeline.output_file, &["csv"])?;
        if let Some(plot) = &self.pipeline.correlation_plot {
            validate_output_extension(plot, &["html"])?;
        }
        Ok(())
    }

    /// The resolved pipeline config as pretty JSON, as echoed to stderr.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.pipeline).context("Failed to serialise pipeline config")
    }
}

pub fn load_pipeline_config(path: &PathBuf) -> Result<PipelineConfig> {
    let config_json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: PipelineConfig = serde_json::from_str(&config_json)
        .with_context(|| format!("Invalid pipeline config: {:?}", path))?;
    Ok(config)
}
