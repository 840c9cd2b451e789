//! End-to-end tests for the `verity` binary.

#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Output};

fn verity(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_verity"))
        .args(args)
        .env_remove("VERITY_GRADER")
        .env_remove("VERITY_WORKERS")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run verity")
}

fn write(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write file");
    path.display().to_string()
}

#[test]
fn test_output_all_pass_exits_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let std_path = write(dir.path(), "std.out", "3\n");
    let a = write(dir.path(), "a.out", "3\n");

    let out = verity(&["output", "--std", &std_path, &a]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 passed, 0 failed"));
}

#[test]
fn test_output_mismatch_exits_one_with_json_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let std_path = write(dir.path(), "std.out", "3\n");
    let a = write(dir.path(), "a.out", "3\n");
    let b = write(dir.path(), "b.out", "4\n");

    let out = verity(&["--format", "json", "output", "--std", &std_path, &a, &b]);
    assert_eq!(out.status.code(), Some(1));

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is not JSON");
    assert_eq!(report["mode"], "output");
    assert_eq!(report["grader"], "FullText");
    assert_eq!(report["passed"][0], a.as_str());
    assert_eq!(report["failed"][0]["label"], b.as_str());
    assert_eq!(report["failed"][0]["state"], "mismatched");
    assert_eq!(report["failed"][0]["diagnostic"]["type"], "hash_mismatch");
}

#[test]
fn test_program_with_reference_program() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "data.in", "5\n");

    let out = verity(&[
        "--sequential",
        "program",
        "--input",
        &input,
        "--std-program",
        "cat",
        "--timeout",
        "5",
        "cat",
        "echo 6",
    ]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("PASS  cat"));
    assert!(stdout.contains("FAIL  echo 6 [mismatched]"));
}

#[test]
fn test_program_without_reference_exits_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "data.in", "5\n");

    let out = verity(&["program", "--input", &input, "cat"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing required reference"));
}

#[test]
fn test_noip_grader_from_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let std_path = write(dir.path(), "std.out", "1 2\n");
    let a = write(dir.path(), "a.out", "1 2   \n\n");

    let out = Command::new(env!("CARGO_BIN_EXE_verity"))
        .args(["output", "--std", &std_path, &a])
        .env("VERITY_GRADER", "NOIPStyle")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run verity");
    assert_eq!(out.status.code(), Some(0));
}
