//! CLI integration tests using the REAL dumpmirror binary

mod common;

use common::dumpmirror_cmd;
use predicates::prelude::*;

#[test]
fn test_help_output() {
    dumpmirror_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("service"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_output() {
    dumpmirror_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dumpmirror"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_version_flag() {
    dumpmirror_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    dumpmirror_cmd().assert().failure();
}

#[test]
fn test_completions_bash() {
    dumpmirror_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dumpmirror"));
}

#[test]
fn test_completions_unknown_shell() {
    dumpmirror_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported shell: tcsh"));
}

#[test]
fn test_sync_help_mentions_no_unpack() {
    dumpmirror_cmd()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-unpack"));
}
