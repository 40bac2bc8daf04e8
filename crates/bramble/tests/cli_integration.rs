//! CLI integration tests for the Bramble command-line interface.
//!
//! These tests do not start a server; they cover help output, argument
//! parsing and startup failures.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the bramble binary, isolated from user config.
fn bramble(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bramble").unwrap();
    cmd.env("BRAMBLE_CONFIG_DIR", config_dir.path())
        .env_remove("BRAMBLE_CONFIG")
        .current_dir(config_dir.path());
    cmd
}

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    bramble(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("session-backed HTTP server"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    bramble(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bramble"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    bramble(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("upload"));
}

#[test]
fn test_missing_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    bramble(&dir).assert().failure();
}

#[test]
fn test_invalid_port_rejected() {
    let dir = TempDir::new().unwrap();
    bramble(&dir)
        .args(["start", "--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_provider_aborts_startup() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[session]\nprovider = \"redis\"\n").unwrap();

    bramble(&dir)
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("redis"));
}

#[test]
fn test_invalid_config_file_aborts_startup() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[session]\nmax_lifetime_secs = 0\n").unwrap();

    bramble(&dir)
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_lifetime_secs"));
}

#[test]
fn test_upload_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    bramble(&dir)
        .args(["upload", "does-not-exist.txt", "--url", "http://127.0.0.1:1/upload"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.txt"));
}
