//! In-memory tabular data used by every pipeline stage.
//!
//! `FeatureTable` pairs a row-major `Array2<f64>` with its column names.
//! Tables are never mutated in place: dropping, selecting and reordering
//! columns all return a new table.
use std::collections::{HashMap, HashSet};

use ndarray::{Array1, Array2, Axis};

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureTable {
    /// Build a table, checking that names are unique and match the column count.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self, PipelineError> {
        if names.len() != values.ncols() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} columns", names.len()),
                got: format!("{} columns", values.ncols()),
            });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::DuplicateColumn(name.clone()));
            }
        }
        Ok(FeatureTable { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Return a table without the named columns. Every name must exist.
    pub fn drop_columns<S: AsRef<str>>(&self, drop: &[S]) -> Result<FeatureTable, PipelineError> {
        let mut to_drop = HashSet::with_capacity(drop.len());
        for name in drop {
            let name = name.as_ref();
            if self.column_index(name).is_none() {
                return Err(PipelineError::UnknownColumn(name.to_string()));
            }
            to_drop.insert(name);
        }

        let keep: Vec<usize> = self
            .names
            .iter()
            .enumerate()
            .filter(|(_, n)| !to_drop.contains(n.as_str()))
            .map(|(i, _)| i)
            .collect();
        Ok(self.take_columns(&keep))
    }

    /// Return a table holding the named columns in the order given.
    pub fn select_columns<S: AsRef<str>>(&self, select: &[S]) -> Result<FeatureTable, PipelineError> {
        let lookup: HashMap<&str, usize> = self
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let indices = select
            .iter()
            .map(|name| {
                lookup
                    .get(name.as_ref())
                    .copied()
                    .ok_or_else(|| PipelineError::UnknownColumn(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let table = self.take_columns(&indices);
        // Re-validate: `select` may name the same column twice.
        FeatureTable::new(table.names, table.values)
    }

    /// Select columns by position. Indices are assumed to be in bounds.
    pub fn take_columns(&self, indices: &[usize]) -> FeatureTable {
        FeatureTable {
            names: indices.iter().map(|&i| self.names[i].clone()).collect(),
            values: self.values.select(Axis(1), indices),
        }
    }

    /// Reorder `self` into the column order of `reference`.
    ///
    /// Both tables must hold the same set of column names; order does not
    /// matter. On mismatch the missing and unexpected names are reported.
    pub fn align_to(&self, reference: &[String]) -> Result<FeatureTable, PipelineError> {
        let own: HashSet<&str> = self.names.iter().map(String::as_str).collect();
        let wanted: HashSet<&str> = reference.iter().map(String::as_str).collect();

        if own != wanted {
            let mut missing: Vec<String> = reference
                .iter()
                .filter(|n| !own.contains(n.as_str()))
                .cloned()
                .collect();
            let mut unexpected: Vec<String> = self
                .names
                .iter()
                .filter(|n| !wanted.contains(n.as_str()))
                .cloned()
                .collect();
            missing.sort();
            unexpected.sort();
            return Err(PipelineError::ColumnMismatch { missing, unexpected });
        }

        self.select_columns(reference)
    }

    /// First non-finite cell in row-major order, if any.
    pub fn find_non_finite(&self) -> Option<(usize, usize)> {
        self.values
            .indexed_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(idx, _)| idx)
    }
}

/// Training table split into features and the trailing label column.
#[derive(Debug, Clone)]
pub struct LabeledTable {
    pub features: FeatureTable,
    pub labels: Array1<i64>,
    pub label_name: String,
}

impl LabeledTable {
    pub fn new(
        features: FeatureTable,
        labels: Array1<i64>,
        label_name: String,
    ) -> Result<Self, PipelineError> {
        if labels.len() != features.nrows() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} labels", features.nrows()),
                got: format!("{} labels", labels.len()),
            });
        }
        Ok(LabeledTable {
            features,
            labels,
            label_name,
        })
    }

    /// Number of rows per class, sorted by class value.
    pub fn class_counts(&self) -> Vec<(i64, usize)> {
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &label in self.labels.iter() {
            *counts.entry(label).or_default() += 1;
        }
        let mut counts: Vec<(i64, usize)> = counts.into_iter().collect();
        counts.sort_unstable();
        counts
    }
}

/// Training and test data with test columns aligned to the training order.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub train: LabeledTable,
    pub test: FeatureTable,
}

impl Datasets {
    pub fn new(train: LabeledTable, test: FeatureTable) -> Result<Self, PipelineError> {
        let test = test.align_to(train.features.names())?;
        Ok(Datasets { train, test })
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "Training data: {} rows, {} feature columns, label column '{}'",
            self.train.features.nrows(),
            self.train.features.ncols(),
            self.train.label_name
        );
        for (class, count) in self.train.class_counts() {
            log::info!("  class {}: {} rows", class, count);
        }
        log::info!(
            "Testing data: {} rows, {} feature columns",
            self.test.nrows(),
            self.test.ncols()
        );
    }
}
