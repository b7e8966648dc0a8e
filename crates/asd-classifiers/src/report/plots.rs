use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use plotly::layout::{Axis, Layout};
use plotly::{HeatMap, Plot};

use crate::error::PipelineError;
use crate::stats::{correlated_pairs, correlation_matrix};

/// Heatmap of absolute pairwise correlation between the named columns of `x`.
pub fn plot_correlation_heatmap(x: &Array2<f64>, names: &[String], title: &str) -> Result<Plot, PipelineError> {
    if names.len() != x.ncols() {
        return Err(PipelineError::ShapeMismatch {
            expected: format!("{} column names", x.ncols()),
            got: format!("{} column names", names.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(PipelineError::EmptyDataset);
    }

    let corr = correlation_matrix(x);
    let z: Vec<Vec<f64>> = corr.outer_iter().map(|row| row.to_vec()).collect();

    let trace = HeatMap::new(names.to_vec(), names.to_vec(), z).name("|r|");

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Feature"))
        .y_axis(Axis::new().title("Feature"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);

    Ok(plot)
}

/// Render the heatmap to a standalone HTML file.
///
/// An unwritable path is returned as an error.
pub fn write_correlation_heatmap<P: AsRef<Path>>(x: &Array2<f64>, names: &[String], path: P) -> Result<()> {
    let path = path.as_ref();
    let plot = plot_correlation_heatmap(x, names, "Selected feature correlation")?;
    for (i, j, r) in correlated_pairs(&correlation_matrix(x), 0.9) {
        log::info!("Highly correlated: {} / {} (|r| = {:.3})", names[i], names[j], r);
    }
    std::fs::write(path, plot.to_html())
        .with_context(|| format!("Failed to write HTML to {}", path.display()))?;
    log::info!("Correlation heatmap written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_heatmap_requires_matching_names() {
        let x = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(plot_correlation_heatmap(&x, &["a".to_string()], "t").is_err());
    }

    #[test]
    fn test_write_heatmap_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corr.html");
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 3.5]];
        write_correlation_heatmap(&x, &["X1".to_string(), "X2".to_string()], &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("X1"));
    }

    #[test]
    fn test_write_heatmap_to_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("corr.html");
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 3.5]];
        let err = write_correlation_heatmap(&x, &["X1".to_string(), "X2".to_string()], &path).unwrap_err();
        assert!(format!("{:#}", err).contains("corr.html"));
    }
}
