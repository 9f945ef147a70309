//! Exit-code contract of the `hvc` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const VALID_TRAIN: &str = "
extract:
  spect_params:
    nperseg: 512
    noverlap: 480
  todo_list:
    - bird_ID: gy6or6
      file_format: evtaf
      data_dirs: [/data/gy6or6]
      output_dir: /out/gy6or6
      labelset: iabcdefghjk
      models:
        - model: svm
          predict_proba: true
          hyperparameters: {C: 1, gamma: 0.01}
";

fn hvc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hvc"))
        .args(args)
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_valid_file_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let job = write(dir.path(), "train.yml", VALID_TRAIN);
    let out = hvc(&["validate", path_str(&job), "--kind", "extract-train"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("OK: "), "{stdout}");
    assert!(stdout.contains("1/1 todo item(s) passed"), "{stdout}");
}

#[test]
fn test_invalid_file_exits_one_and_prints_findings() {
    let dir = tempfile::tempdir().unwrap();
    let job = write(
        dir.path(),
        "train.yml",
        &VALID_TRAIN.replace("predict_proba: true", "predict_proba: false"),
    );
    let out = hvc(&["validate", path_str(&job), "--kind", "extract-train"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("FAIL: "), "{stdout}");
    assert!(
        stdout.contains("model 'svm' must be trained with 'predict_proba: true'"),
        "{stdout}"
    );
}

#[test]
fn test_json_output_is_array_of_reports() {
    let dir = tempfile::tempdir().unwrap();
    let job = write(dir.path(), "train.yml", VALID_TRAIN);
    let out = hvc(&["validate", path_str(&job), "--kind", "train", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let reports: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(reports[0]["ok"], true);
    assert_eq!(reports[0]["errors"], serde_json::json!([]));
}

#[test]
fn test_missing_file_exits_two() {
    let out = hvc(&["validate", "/nonexistent/hvc/job.yml", "--kind", "predict"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_broken_ruleset_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(dir.path(), "rules.yml", "valid_models: {sklearn: [svm]}\n");
    let out = hvc(&["schema", "check", path_str(&rules)]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_schema_show_builtin() {
    let out = hvc(&["schema", "show"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("model flatwindow"), "{stdout}");
}
