//! Prediction output in the `ID,Predicted` submission format.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;

/// Ordered predictions; row `i` (0-based) is written with ID `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    predictions: Vec<i64>,
}

impl Submission {
    pub fn from_predictions(predictions: &Array1<i64>) -> Self {
        Submission {
            predictions: predictions.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// `(id, label)` pairs with 1-based ids.
    pub fn rows(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.predictions
            .iter()
            .enumerate()
            .map(|(i, &label)| (i + 1, label))
    }

    /// Write the header followed by one row per prediction.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["ID", "Predicted"])?;
        for (id, label) in self.rows() {
            writer.write_record([id.to_string(), label.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Create (or truncate) `path` and write the submission to it.
pub fn write_submission<P: AsRef<Path>>(path: P, submission: &Submission) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    submission
        .write_to(BufWriter::new(file))
        .with_context(|| format!("Failed to write submission: {}", path.display()))?;
    log::info!("Wrote {} predictions to {}", submission.len(), path.display());
    Ok(())
}
