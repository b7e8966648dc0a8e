//! Both presets on a table as wide as the screening data (X1..X595).

use std::fs;
use std::path::Path;

use asd_classifiers::data_handling::{Datasets, FeatureTable, LabeledTable};
use asd_classifiers::{Pipeline, PipelineConfig, PipelineOutput, Preset};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const N_COLUMNS: usize = 595;
const N_TRAIN: usize = 120;
const N_TEST: usize = 40;

/// Columns whose values follow the label; the rest are uniform noise.
fn is_informative(column: usize) -> bool {
    column <= 20 || [318, 404, 528, 579, 584].contains(&column)
}

fn names() -> Vec<String> {
    (1..=N_COLUMNS).map(|i| format!("X{}", i)).collect()
}

fn sample(rng: &mut ChaCha8Rng, n: usize) -> (Array2<f64>, Array1<i64>) {
    let labels = Array1::from_iter((0..n).map(|i| (i % 2) as i64));
    let mut x = Array2::<f64>::zeros((n, N_COLUMNS));
    for (mut row, &label) in x.rows_mut().into_iter().zip(labels.iter()) {
        for (j, v) in row.iter_mut().enumerate() {
            let noise: f64 = rng.gen();
            *v = if is_informative(j + 1) { 3.0 * label as f64 + noise } else { noise };
        }
    }
    (x, labels)
}

fn datasets() -> (Datasets, Array1<i64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(595);
    let (x_train, y_train) = sample(&mut rng, N_TRAIN);
    let (x_test, y_test) = sample(&mut rng, N_TEST);
    let train = LabeledTable::new(
        FeatureTable::new(names(), x_train).unwrap(),
        y_train,
        "Class".to_string(),
    )
    .unwrap();
    let test = FeatureTable::new(names(), x_test).unwrap();
    (Datasets::new(train, test).unwrap(), y_test)
}

fn run(preset: Preset, dir: &Path, file: &str) -> (PipelineOutput, String) {
    let mut config = PipelineConfig::preset(preset);
    config.output_file = dir.join(file).to_string_lossy().into_owned();
    let (data, _) = datasets();
    let output = Pipeline::new(config.clone()).run_on(data).unwrap();
    let written = fs::read_to_string(&config.output_file).unwrap();
    (output, written)
}

fn holdout_accuracy(output: &PipelineOutput, truth: &Array1<i64>) -> f64 {
    let hits = output
        .submission
        .rows()
        .filter(|&(id, predicted)| truth[id - 1] == predicted)
        .count();
    hits as f64 / truth.len() as f64
}

#[test]
fn test_correlation_elimination_on_wide_table() {
    let dir = tempfile::tempdir().unwrap();
    let (output, written) = run(Preset::CorrelationElimination, dir.path(), "a.csv");
    let (_, again) = run(Preset::CorrelationElimination, dir.path(), "b.csv");
    assert_eq!(written, again);

    assert_eq!(output.reducer.selector().selected_names().len(), 50);
    assert_eq!(output.reducer.output_width(), 45);
    for dropped in ["X584", "X579", "X404", "X528", "X318"] {
        assert!(output.reducer.selector().selected_names().iter().any(|n| n == dropped));
        assert!(!output.selected_features().iter().any(|n| n == dropped));
    }

    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), N_TEST + 1);
    assert_eq!(lines[0], "ID,Predicted");
    assert_eq!(output.training_accuracy, 1.0);
    let (_, truth) = datasets();
    assert!(holdout_accuracy(&output, &truth) >= 0.9);
}

#[test]
fn test_constant_elimination_on_wide_table() {
    let dir = tempfile::tempdir().unwrap();
    let (output, written) = run(Preset::ConstantElimination, dir.path(), "a.csv");
    let (_, again) = run(Preset::ConstantElimination, dir.path(), "b.csv");
    assert_eq!(written, again);

    assert_eq!(output.reducer.selector().selected_names().len(), 100);
    assert_eq!(output.reducer.output_width(), 80);
    assert_eq!(output.reducer.pca().unwrap().components().dim(), (80, 100));
    for dropped in ["X3", "X31", "X32", "X127", "X128", "X590"] {
        assert!(!output.selected_features().iter().any(|n| n == dropped));
    }

    assert_eq!(written.lines().count(), N_TEST + 1);
    let ids: Vec<usize> = output.submission.rows().map(|(id, _)| id).collect();
    assert_eq!(ids, (1..=N_TEST).collect::<Vec<_>>());
    let (_, truth) = datasets();
    assert!(holdout_accuracy(&output, &truth) >= 0.9);
}
