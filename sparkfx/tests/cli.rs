//! CLI integration tests
//!
//! These run the real binary against effect files created in a temporary
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sparkfx() -> Command {
    Command::cargo_bin("sparkfx").unwrap()
}

fn create(dir: &Path, file: &str, shape: &str) -> std::path::PathBuf {
    let path = dir.join(file);
    sparkfx()
        .args(["new", "--shape", shape, "--name", "Sparks", "--budget", "50"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created effect"));
    path
}

#[test]
fn test_new_info_validate_simulate() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), "campfire.fx", "rect");

    sparkfx()
        .arg("info")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("campfire"))
        .stdout(predicate::str::contains("Sparks"))
        .stdout(predicate::str::contains("rect 100x100"));

    sparkfx()
        .args(["validate", "--strict"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    sparkfx()
        .args(["simulate", "--frames", "30", "--seed", "7"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Active particles"));
}

#[test]
fn test_info_json() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), "outline.fx", "polygon");

    let output = sparkfx().arg("info").arg("--json").arg(&path).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "outline");
    assert_eq!(json["emitters"][0]["name"], "Sparks");
    assert_eq!(json["emitters"][0]["kind"], "Polygon");
    assert_eq!(json["emitters"][0]["budget"], 50);
}

#[test]
fn test_simulate_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), "cone.fx", "cone");

    let run = || {
        sparkfx()
            .args(["simulate", "--frames", "40", "--seed", "3"])
            .arg(&path)
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_new_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), "once.fx", "cone");

    sparkfx()
        .arg("new")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sparkfx().arg("new").arg("--force").arg(&path).assert().success();
}

#[test]
fn test_new_rejects_bad_input() {
    let dir = TempDir::new().unwrap();

    sparkfx()
        .args(["new", "--shape", "spiral"])
        .arg(dir.path().join("spiral.fx"))
        .assert()
        .failure();

    sparkfx()
        .args(["new", "--budget", "0"])
        .arg(dir.path().join("empty.fx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid budget"));
}

#[test]
fn test_corrupt_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.fx");
    fs::write(&path, b"not an effect file").unwrap();

    for command in ["info", "validate", "simulate"] {
        sparkfx()
            .arg(command)
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read"));
    }
}

#[test]
fn test_missing_file_fails() {
    sparkfx()
        .args(["info", "does-not-exist.fx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open file"));
}

#[test]
fn test_completions() {
    sparkfx()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sparkfx"));
}
