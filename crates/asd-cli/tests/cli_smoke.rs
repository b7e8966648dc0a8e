//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `asd` binary to verify that
//! argument parsing, help text, and error handling work end-to-end.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("asd").unwrap()
}

const TRAIN: &str = "X1,X2,X3,Class
1,0,4,1
0,1,1,0
1,0,5,1
0,1,2,0
1,1,6,1
0,0,1,0
";

const TEST: &str = "X1,X2,X3
1,0,5
0,1,1
";

fn write_inputs(dir: &Path) -> (String, String) {
    let train = dir.join("train.csv");
    let test = dir.join("test.csv");
    fs::write(&train, TRAIN).unwrap();
    fs::write(&test, TEST).unwrap();
    (
        train.to_string_lossy().into_owned(),
        test.to_string_lossy().into_owned(),
    )
}

fn write_config(dir: &Path, k_best: usize) -> String {
    let (train, test) = write_inputs(dir);
    let config = serde_json::json!({
        "train_data": train,
        "test_data": test,
        "output_file": dir.join("submission.csv"),
        "reduction": { "k_best": k_best, "post_selection_drop": [] }
    });
    let path = dir.join("config.json");
    fs::write(&path, config.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("template"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("asd"));
}

// ---------------------------------------------------------------------------
// template
// ---------------------------------------------------------------------------

#[test]
fn template_prints_default_preset() {
    cmd()
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"k_best\": 50"))
        .stdout(predicate::str::contains("X584"))
        .stdout(predicate::str::contains("AdaBoost"));
}

#[test]
fn template_constant_elimination() {
    cmd()
        .args(["template", "--preset", "constant-elimination"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pca_components\": 80"))
        .stdout(predicate::str::contains("DecisionTree"));
}

#[test]
fn template_unknown_preset_errors() {
    cmd().args(["template", "-p", "nope"]).assert().failure();
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_with_config_writes_submission() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), 2);
    cmd().args(["run", &config]).assert().success();

    let written = fs::read_to_string(dir.path().join("submission.csv")).unwrap();
    assert_eq!(written, "ID,Predicted\n1,1\n2,0\n");
}

#[test]
fn run_output_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), 2);
    let out = dir.path().join("other.csv");
    cmd()
        .args(["run", &config, "-o", out.to_str().unwrap()])
        .assert()
        .success();
    assert!(out.exists());
    assert!(!dir.path().join("submission.csv").exists());
}

#[test]
fn run_with_correlation_plot() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), 2);
    let plot = dir.path().join("corr.html");
    cmd()
        .args(["run", &config, "--correlation-plot", plot.to_str().unwrap()])
        .assert()
        .success();
    assert!(plot.exists());
}

#[test]
fn run_preset_on_small_data_fails_with_invalid_k() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = write_inputs(dir.path());
    let out = dir.path().join("submission.csv");
    cmd()
        .args(["run", "-t", &train, "-e", &test, "-o", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No config file provided"))
        .stderr(predicate::str::contains("\"k_best\": 50"))
        .stderr(predicate::str::contains("k=50"));
    assert!(!out.exists());
}

#[test]
fn run_missing_input_errors() {
    cmd()
        .args(["run", "-t", "/nonexistent/train.csv", "-e", "/nonexistent/test.csv", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn run_nonexistent_config_errors() {
    cmd()
        .args(["run", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn run_config_and_preset_conflict() {
    cmd()
        .args(["run", "config.json", "--preset", "constant-elimination"])
        .assert()
        .failure();
}
