//! CLI integration tests using the real `ml` binary

mod common;

use common::{TestHub, ml_cmd};
use predicates::prelude::*;

#[test]
fn test_help_output() {
    ml_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("installed"));
}

#[test]
fn test_version_output() {
    ml_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("ml {}", env!("CARGO_PKG_VERSION"))))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_version_of_missing_package() {
    let hub = TestHub::new();
    hub.ml()
        .args(["version", "rain"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Package 'rain' is not installed"));
}

#[test]
fn test_completions_bash() {
    ml_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_ml"));
}

#[test]
fn test_completions_unknown_shell() {
    ml_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Unknown shell 'tcsh'"));
}

#[test]
fn test_installed_empty_home() {
    let hub = TestHub::new();
    hub.ml()
        .arg("installed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 packages installed"))
        .stdout(predicate::str::contains("$ ml install <reference>"));
}

#[test]
fn test_init_dir_from_environment() {
    let hub = TestHub::new();
    let pkg = hub.path("rain");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("MLHUB.yaml"), common::manifest("rain", "2", "")).unwrap();

    ml_cmd()
        .env("MLINIT", hub.home.path())
        .args(["version", "rain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rain 2"));
}

#[test]
fn test_unknown_reference() {
    let hub = TestHub::new();
    hub.ml()
        .args(["install", "rain"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Cannot tell what package 'rain' refers to"));
}
