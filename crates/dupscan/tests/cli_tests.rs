//! CLI integration tests for dupscan.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the dupscan binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("dupscan").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn file_list(paths: &[&Path]) -> String {
    paths
        .iter()
        .map(|p| p.to_str().unwrap())
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Find field values that occur more than once",
        ))
        .stdout(predicate::str::contains("--pattern"))
        .stdout(predicate::str::contains("--keep-going"));
}

#[test]
fn test_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dupscan"));
}

#[test]
fn test_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dupscan"));
}

// ============================================================================
// File Selection Tests
// ============================================================================

#[test]
fn test_no_files_exits_cleanly() {
    cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "no filenames or pattern given, exiting",
        ))
        .stdout(predicate::str::contains("DUPLICATE FOUND").not());
}

#[test]
fn test_pattern_without_matches_exits_cleanly() {
    let temp = TempDir::new().unwrap();
    let pattern = temp.path().join("*.csv");

    cmd()
        .args(["--pattern", pattern.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "no filenames or pattern given, exiting",
        ));
}

#[test]
fn test_invalid_pattern_fails() {
    cmd()
        .args(["--pattern", "a/***"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot glob provided pattern"));
}

#[test]
fn test_non_ascii_delimiter_fails() {
    cmd()
        .args(["--files", "a.csv", "--delimiter", "é"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "delimiter must be a single ASCII character",
        ));
}

// ============================================================================
// Duplicate Reporting Tests
// ============================================================================

#[test]
fn test_duplicate_across_files() {
    let temp = TempDir::new().unwrap();
    let a = write_csv(temp.path(), "a.csv", "header,code\nx,CODE1\nx,CODE2\n");
    let b = write_csv(temp.path(), "b.csv", "header,code\nx,CODE1\n");

    let assert = cmd()
        .args(["--files", &file_list(&[&a, &b])])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "DUPLICATE FOUND: CODE1 found 2 times",
        ))
        .stdout(predicate::str::contains("done"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.matches("DUPLICATE FOUND").count(), 1);
    assert!(!stdout.contains("CODE2 found"));
}

#[test]
fn test_pattern_selects_files() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "a.csv", "h,c\n1,SAME\n");
    write_csv(temp.path(), "b.csv", "h,c\n1,SAME\n2,SAME\n");
    write_csv(temp.path(), "ignored.txt", "h,c\n1,SAME\n");
    let pattern = temp.path().join("*.csv");

    cmd()
        .args(["--pattern", pattern.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "DUPLICATE FOUND: SAME found 3 times",
        ));
}

#[test]
fn test_field_and_delimiter_options() {
    let temp = TempDir::new().unwrap();
    let a = write_csv(temp.path(), "a.txt", "code;name\nK1;x\nK1;y\nK2;z\n");

    cmd()
        .args([
            "--files",
            a.to_str().unwrap(),
            "--field",
            "0",
            "--delimiter",
            ";",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("DUPLICATE FOUND: K1 found 2 times"))
        .stdout(predicate::str::contains("K2 found").not());
}

#[test]
fn test_no_duplicates() {
    let temp = TempDir::new().unwrap();
    let a = write_csv(temp.path(), "a.csv", "h,c\n1,A\n2,B\n");

    cmd()
        .args(["--files", a.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("DUPLICATE FOUND").not())
        .stdout(predicate::str::contains("done"));
}

// ============================================================================
// Exit Status Tests
// ============================================================================

#[test]
fn test_unreadable_file_exits_one() {
    let temp = TempDir::new().unwrap();
    let good = write_csv(temp.path(), "good.csv", "h,c\n1,DUP\n2,DUP\n");
    let missing = temp.path().join("missing.csv");

    cmd()
        .args(["--files", &file_list(&[&missing, &good])])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DUPLICATE FOUND: DUP found 2 times"))
        .stdout(predicate::str::contains("done"));
}

#[test]
fn test_non_utf8_field_is_counted() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("latin1.csv");
    fs::write(&path, b"id,code\n1,caf\xe9\n2,caf\xe9\n").unwrap();

    cmd()
        .args(["--files", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("DUPLICATE FOUND: caf"))
        .stdout(predicate::str::contains("found 2 times"));
}

#[test]
fn test_keep_going_still_reports_duplicates() {
    let temp = TempDir::new().unwrap();
    let good = write_csv(temp.path(), "good.csv", "h,c\n1,DUP\n2,DUP\n");
    let missing = temp.path().join("missing.csv");

    cmd()
        .args(["--files", &file_list(&[&missing, &good]), "--keep-going"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DUPLICATE FOUND: DUP found 2 times"));
}

#[test]
fn test_decode_failure_exits_two() {
    let temp = TempDir::new().unwrap();
    let broken = write_csv(temp.path(), "broken.csv", "h,c\n1,A\n2\n");

    cmd()
        .args(["--files", broken.to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn test_decode_failure_outranks_open_failure() {
    let temp = TempDir::new().unwrap();
    let broken = write_csv(temp.path(), "broken.csv", "h,c\n1,A\n2\n");
    let missing = temp.path().join("missing.csv");

    cmd()
        .args(["--files", &file_list(&[&missing, &broken])])
        .assert()
        .code(2);
}

// ============================================================================
// JSON Output Tests
// ============================================================================

#[test]
fn test_json_output() {
    let temp = TempDir::new().unwrap();
    let a = write_csv(temp.path(), "a.csv", "header,code\nx,CODE1\nx,CODE2\n");
    let b = write_csv(temp.path(), "b.csv", "header,code\nx,CODE1\n");

    let assert = cmd()
        .args(["--files", &file_list(&[&a, &b]), "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["total_values"], 3);
    assert_eq!(json["distinct_values"], 2);
    assert_eq!(json["status"], "clean");
    assert_eq!(json["exit_code"], 0);
    assert_eq!(json["duplicates"][0]["value"], "CODE1");
    assert_eq!(json["duplicates"][0]["count"], 2);
    assert_eq!(json["duplicates"].as_array().unwrap().len(), 1);
    assert_eq!(json["files"].as_array().unwrap().len(), 2);
    assert_eq!(json["files"][0]["outcome"]["status"], "completed");
}

#[test]
fn test_json_output_reports_failure() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.csv");

    let assert = cmd()
        .args(["--files", missing.to_str().unwrap(), "--json"])
        .assert()
        .code(1);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["status"], "open_failure");
    assert_eq!(json["files"][0]["outcome"]["status"], "open_failed");
    assert!(json["files"][0]["outcome"]["error"]
        .as_str()
        .unwrap()
        .contains("could not open file"));
}
