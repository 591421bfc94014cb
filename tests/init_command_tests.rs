//! Integration tests for `dumpmirror init`

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

#[test]
fn test_init_writes_default_config() {
    let workspace = TestWorkspace::new();

    workspace
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));

    let yaml = std::fs::read_to_string(workspace.config_path()).unwrap();
    assert!(yaml.contains("listing_url"));
    assert!(yaml.contains("{locale}"));
    assert!(yaml.contains("keep_versions: 12"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let workspace = TestWorkspace::new();
    workspace.write_config("");
    let before = std::fs::read_to_string(workspace.config_path()).unwrap();

    workspace
        .cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read_to_string(workspace.config_path()).unwrap(),
        before
    );
}

#[test]
fn test_init_force_replaces_broken_config() {
    let workspace = TestWorkspace::new();
    std::fs::write(workspace.config_path(), "schedule: [not, a, map").unwrap();

    workspace.cmd().args(["init", "--force"]).assert().success();

    workspace.cmd().args(["status", "--json"]).assert().success();
}

#[test]
fn test_init_uses_config_from_environment() {
    let workspace = TestWorkspace::new();
    let path = workspace.path.join("from-env/config.yaml");

    common::dumpmirror_cmd()
        .env("DUMPMIRROR_CONFIG", &path)
        .arg("init")
        .assert()
        .success();

    assert!(path.exists());
}
