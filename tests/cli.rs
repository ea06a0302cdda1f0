//! Integration tests for the command-line interface of `ppreflow`.
//!
//! This module validates file and standard-input handling, the `--in-place`
//! flag, the options that map onto the reflow configuration, and error
//! reporting for malformed input.

use std::fs;

use tempfile::tempdir;

#[macro_use]
mod prelude;
use prelude::*;

fn ppreflow() -> Command { Command::cargo_bin("ppreflow").expect("Failed to create cargo command for ppreflow") }

/// Verifies that `--in-place` without a file argument is rejected.
#[test]
fn test_cli_in_place_requires_file() { ppreflow().arg("--in-place").assert().failure(); }

/// Verifies that the `--version` flag prints the crate version and exits.
#[test]
fn test_cli_version_flag() {
    ppreflow()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("ppreflow {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_process_file() {
    let dir = tempdir().expect("failed to create temporary directory");
    let file_path = dir.path().join("sample.txt");
    fs::write(&file_path, "one two three four five six seven\n").expect("failed to write file");
    ppreflow()
        .args(["--width", "20"])
        .arg(&file_path)
        .assert()
        .success()
        .stdout("one two three four\nfive six seven\n");
}

#[test]
fn test_cli_in_place() {
    let dir = tempdir().expect("failed to create temporary directory");
    let file_path = dir.path().join("sample.txt");
    fs::write(&file_path, "/#\nquoted words\n#/\n").expect("failed to write file");
    ppreflow()
        .arg("--in-place")
        .arg(&file_path)
        .assert()
        .success()
        .stdout("");
    let out = fs::read_to_string(&file_path).expect("failed to read file");
    assert_eq!(out, "/#\n    quoted words\n#/\n");
}

#[test]
fn test_cli_tables_only_from_stdin() {
    ppreflow()
        .args(["--tables-only", "--width", "10"])
        .write_stdin("keep   this\n\n/T\na  b\nT/\n")
        .assert()
        .success()
        .stdout("keep   this\n\n/T\na     b\nT/\n");
}

#[rstest]
#[case("poetry", "/P\nverse\nP/\n", "/P\nverse\nP/\n")]
#[case("literal-indent", "/*\nfixed\n*/\n", "/*\nfixed\n*/\n")]
#[case("centered", "/#\n/C\nmid\nC/\n#/\n", "/#\n/C\nmid\nC/\n#/\n")]
fn test_cli_skip(#[case] kind: &str, #[case] input: &str, #[case] expected: &str) {
    ppreflow()
        .args(["--skip", kind])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(expected.to_string());
}

#[test]
fn test_cli_margins_option() {
    ppreflow()
        .args(["--margins", "block-quote=[2.0,2]"])
        .write_stdin("/#\nquoted\n#/\n")
        .assert()
        .success()
        .stdout("/#\n  quoted\n#/\n");
}

#[test]
fn test_cli_rejects_bad_margins() {
    ppreflow()
        .args(["--margins", "poetry=wide"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid margins"));
}

#[test]
fn test_cli_tags_option() {
    ppreflow()
        .args(["--tags", "zero", "--width", "7"])
        .write_stdin("<i>abc</i> <i>def</i>\n")
        .assert()
        .success()
        .stdout("<i>abc</i> <i>def</i>\n");
}

#[test]
fn test_cli_reports_unclosed_markup() {
    ppreflow()
        .write_stdin("/P\nverse\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("`/P` is never closed"));
}

#[test]
fn test_cli_in_place_keeps_malformed_file() {
    let dir = tempdir().expect("failed to create temporary directory");
    let file_path = dir.path().join("broken.txt");
    fs::write(&file_path, "stray\n\nX/\n").expect("failed to write file");
    ppreflow()
        .arg("--in-place")
        .arg(&file_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rewriting"));
    let out = fs::read_to_string(&file_path).expect("failed to read file");
    assert_eq!(out, "stray\n\nX/\n");
}
