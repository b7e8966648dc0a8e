use std::fs;
use std::path::Path;

use asd_classifiers::config::{ModelType, PipelineConfig, ReductionConfig};
use asd_classifiers::feature_selection::ScoreFunction;
use asd_classifiers::io::{load_datasets, read_training_table};
use asd_classifiers::reduction::FeatureReducer;
use asd_classifiers::{Pipeline, PipelineError};

const TRAIN: &str = "X1,X2,X3,X4,X5,Class
1,0,3,7,2,1
0,1,3,1,2.5,0
1,0,3,6,1,1
0,1,3,2,3,0
1,0,3,8,2,1
0,1,3,1.5,0.5,0
1,1,3,7.5,1,1
0,0,3,0.5,2,0
1,0,3,6.5,1.5,1
0,1,3,2.5,2,0
";

const TEST: &str = "X1,X2,X3,X4,X5
1,0,3,7,1
0,1,3,1,2
1,0,3,9,2
";

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn config(dir: &Path, model: ModelType) -> PipelineConfig {
    PipelineConfig {
        train_data: write(dir, "train.csv", TRAIN),
        test_data: write(dir, "test.csv", TEST),
        output_file: dir.join("submission.csv").to_string_lossy().into_owned(),
        reduction: ReductionConfig {
            drop_columns: vec!["X5".to_string()],
            drop_constant_features: false,
            score_function: ScoreFunction::Chi2,
            k_best: 2,
            post_selection_drop: Vec::new(),
            pca_components: None,
        },
        model,
        correlation_plot: None,
    }
}

#[test]
fn test_submission_has_header_and_one_row_per_test_sample() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), ModelType::default());
    let output = Pipeline::new(cfg.clone()).run().unwrap();

    let written = fs::read_to_string(&cfg.output_file).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ID,Predicted");
    assert_eq!(lines[1..], ["1,1", "2,0", "3,1"]);
    assert_eq!(output.selected_features(), &["X1", "X4"]);
}

#[test]
fn test_decision_tree_with_pca() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "decision_tree".parse().unwrap());
    cfg.reduction.k_best = 3;
    cfg.reduction.pca_components = Some(2);
    let output = Pipeline::new(cfg.clone()).run().unwrap();
    assert_eq!(output.reducer.output_width(), 2);
    assert_eq!(output.submission.len(), 3);
    let ids: Vec<usize> = output.submission.rows().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "tree".parse().unwrap());
    cfg.reduction.k_best = 3;
    Pipeline::new(cfg.clone()).run().unwrap();
    let first = fs::read(&cfg.output_file).unwrap();
    Pipeline::new(cfg.clone()).run().unwrap();
    let second = fs::read(&cfg.output_file).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reducer_ignores_test_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    cfg.reduction.k_best = 3;
    cfg.reduction.pca_components = Some(2);

    let train = read_training_table(&cfg.train_data).unwrap();
    let reducer = FeatureReducer::new(cfg.reduction.clone());
    let alone = reducer.fit(&train.features, &train.labels).unwrap();

    let datasets = load_datasets(&cfg.train_data, &cfg.test_data).unwrap();
    let with_test = reducer.fit(&datasets.train.features, &datasets.train.labels).unwrap();
    let before = with_test.clone();
    with_test.transform(&datasets.test).unwrap();

    assert_eq!(alone, with_test);
    assert_eq!(with_test, before);
}

#[test]
fn test_k_larger_than_feature_count_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    cfg.reduction.k_best = 5;
    let err = Pipeline::new(cfg.clone()).run().unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::InvalidK { k: 5, available: 4 })
    );
    assert!(!Path::new(&cfg.output_file).exists());
}

#[test]
fn test_test_columns_must_match_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    cfg.test_data = write(dir.path(), "bad_test.csv", "X1,X2,X3,X4,X6\n1,0,3,7,1\n");
    let err = Pipeline::new(cfg).run().unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::ColumnMismatch {
            missing: vec!["X5".to_string()],
            unexpected: vec!["X6".to_string()],
        })
    );
}

#[test]
fn test_reordered_test_columns_are_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    let reordered = "X5,X4,X3,X2,X1\n1,7,3,0,1\n2,1,3,1,0\n2,9,3,0,1\n";
    cfg.test_data = write(dir.path(), "reordered.csv", reordered);
    Pipeline::new(cfg.clone()).run().unwrap();
    let written = fs::read_to_string(&cfg.output_file).unwrap();
    assert_eq!(written, "ID,Predicted\n1,1\n2,0\n3,1\n");
}

#[test]
fn test_correlation_plot_is_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    let plot = dir.path().join("corr.html");
    Pipeline::new(cfg.clone()).run().unwrap();
    assert!(!plot.exists());

    cfg.correlation_plot = Some(plot.to_string_lossy().into_owned());
    Pipeline::new(cfg).run().unwrap();
    assert!(plot.exists());
}

#[test]
fn test_correlation_plot_covers_every_selected_column() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    cfg.reduction.k_best = 3;
    cfg.reduction.post_selection_drop = vec!["X2".to_string()];
    let plot = dir.path().join("corr.html");
    cfg.correlation_plot = Some(plot.to_string_lossy().into_owned());

    let output = Pipeline::new(cfg).run().unwrap();
    assert_eq!(output.selected_features(), &["X1", "X4"]);
    let html = fs::read_to_string(&plot).unwrap();
    assert!(html.contains("\"X2\""), "dropped column missing from heatmap");
}

#[test]
fn test_unwritable_plot_path_is_an_error_after_submission() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelType::default());
    let plot = dir.path().join("missing").join("corr.html");
    cfg.correlation_plot = Some(plot.to_string_lossy().into_owned());

    let err = Pipeline::new(cfg.clone()).run().unwrap_err();
    assert!(format!("{:#}", err).contains("correlation heatmap"));
    assert_eq!(fs::read_to_string(&cfg.output_file).unwrap().lines().count(), 4);
}
