//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_version_subcommand() {
    let mut cmd = Command::cargo_bin("cfexport").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cfexport version"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("cfexport").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_export_without_api_url_fails() {
    let mut cmd = Command::cargo_bin("cfexport").unwrap();
    cmd.env_clear()
        .env("HOME", "/nonexistent")
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("EXPORTER_API_URL"));
}

#[test]
fn test_export_rejects_unknown_schema() {
    let mut cmd = Command::cargo_bin("cfexport").unwrap();
    cmd.env_clear()
        .args(["export", "--schema", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
