//! CSV/TSV reader for feature tables.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::StringRecord;

use crate::data_handling::{Datasets, FeatureTable, LabeledTable};
use ndarray::{Array1, Array2};

/// Options for reading a delimited feature table.
#[derive(Debug, Clone)]
pub struct TableReaderConfig {
    /// Field delimiter. `None` picks tab for `.tsv` files and comma otherwise.
    pub delimiter: Option<u8>,
}

impl Default for TableReaderConfig {
    fn default() -> Self {
        Self { delimiter: None }
    }
}

impl TableReaderConfig {
    fn delimiter_for(&self, path: &Path) -> u8 {
        if let Some(d) = self.delimiter {
            return d;
        }
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("tsv") => b'\t',
            _ => b',',
        }
    }
}

/// Read a table whose columns are all numeric features.
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<FeatureTable> {
    read_feature_table_with_config(path, &TableReaderConfig::default())
}

pub fn read_feature_table_with_config<P: AsRef<Path>>(
    path: P,
    config: &TableReaderConfig,
) -> Result<FeatureTable> {
    let (headers, values) = read_numeric(path.as_ref(), config)?;
    FeatureTable::new(headers, values)
        .with_context(|| format!("Invalid table: {}", path.as_ref().display()))
}

/// Read a training table: all columns but the last are features, the last
/// column holds integer class labels.
pub fn read_training_table<P: AsRef<Path>>(path: P) -> Result<LabeledTable> {
    read_training_table_with_config(path, &TableReaderConfig::default())
}

pub fn read_training_table_with_config<P: AsRef<Path>>(
    path: P,
    config: &TableReaderConfig,
) -> Result<LabeledTable> {
    let path = path.as_ref();
    let (mut headers, values) = read_numeric(path, config)?;
    if headers.len() < 2 {
        bail!(
            "Training file {} needs at least one feature column and a label column",
            path.display()
        );
    }

    let label_col = headers.len() - 1;
    let label_name = headers.pop().unwrap_or_default();

    let labels = values
        .column(label_col)
        .iter()
        .enumerate()
        .map(|(row, &v)| {
            if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(anyhow!(
                    "Invalid label '{}' at row {} of {}",
                    v,
                    row + 1,
                    path.display()
                ))
            }
        })
        .collect::<Result<Vec<i64>>>()?;

    let features = values.slice(ndarray::s![.., ..label_col]).to_owned();
    let features = FeatureTable::new(headers, features)
        .with_context(|| format!("Invalid table: {}", path.display()))?;

    Ok(LabeledTable::new(features, Array1::from_vec(labels), label_name)?)
}

/// Read the training and test files and align the test columns to the
/// training feature order.
pub fn load_datasets<P: AsRef<Path>, Q: AsRef<Path>>(train_path: P, test_path: Q) -> Result<Datasets> {
    let train = read_training_table(&train_path)?;
    let test = read_feature_table(&test_path)?;
    let datasets = Datasets::new(train, test).with_context(|| {
        format!(
            "Test file {} does not match the features of {}",
            test_path.as_ref().display(),
            train_path.as_ref().display()
        )
    })?;
    Ok(datasets)
}

fn read_numeric(path: &Path, config: &TableReaderConfig) -> Result<(Vec<String>, Array2<f64>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_for(path))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .clone();
    let headers = validate_headers(&headers, path)?;
    let n_cols = headers.len();

    let mut values = Vec::new();
    let mut n_rows = 0usize;
    for (row_idx, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("Failed to read row {} of {}", row_idx + 1, path.display()))?;
        if record.len() != n_cols {
            bail!(
                "Row {} of {} has {} fields, expected {}",
                row_idx + 1,
                path.display(),
                record.len(),
                n_cols
            );
        }
        for (col_idx, field) in record.iter().enumerate() {
            let parsed = field.parse::<f64>().with_context(|| {
                format!(
                    "Invalid value '{}' in column '{}' at row {} of {}",
                    field,
                    headers[col_idx],
                    row_idx + 1,
                    path.display()
                )
            })?;
            values.push(parsed);
        }
        n_rows += 1;
    }

    let values = Array2::from_shape_vec((n_rows, n_cols), values)
        .context("Failed to build feature matrix")?;
    Ok((headers, values))
}

fn validate_headers(headers: &StringRecord, path: &Path) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            bail!("Empty header for column {} in {}", idx + 1, path.display());
        }
        if !seen.insert(header) {
            bail!("Duplicate column '{}' in {}", header, path.display());
        }
        names.push(header.to_string());
    }
    if names.is_empty() {
        bail!("No columns found in {}", path.display());
    }
    Ok(names)
}
