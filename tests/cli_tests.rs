//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_settings(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("settings.yml");
    fs::write(&path, content).expect("write settings");
    path
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("clikit"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("settings files"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_check_accepts_valid_settings() {
    let tmp = TempDir::new().expect("tmp");
    let cache_dir = tmp.path().join("cache");
    let path = write_settings(
        &tmp,
        &format!(
            "description: Demo tool\ncache:\n  type: line\n  directory: {}\n  filename: c.db\nsettings:\n  retries: 3\n  name: x\n",
            cache_dir.display()
        ),
    );

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.arg("check").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK:"))
        .stdout(predicate::str::contains("Cache: line"))
        .stdout(predicate::str::contains("Settings: 2"));
}

#[test]
fn test_check_rejects_unknown_cache_type() {
    let tmp = TempDir::new().expect("tmp");
    let path = write_settings(&tmp, "cache:\n  type: redis\n");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.arg("check").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid cache type 'redis' (known types: line)"));
}

#[test]
fn test_check_rejects_malformed_yaml() {
    let tmp = TempDir::new().expect("tmp");
    let path = write_settings(&tmp, "logger: [unclosed\n");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.arg("check").arg(&path);
    cmd.assert().failure().stderr(predicate::str::contains("malformed settings"));
}

#[test]
fn test_check_uses_default_location() {
    let tmp = TempDir::new().expect("tmp");
    fs::create_dir(tmp.path().join("config")).expect("mkdir");
    fs::write(tmp.path().join("config").join("settings.yml"), "settings:\n  a: 1\n")
        .expect("write");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.current_dir(tmp.path()).arg("check");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("settings.yml"))
        .stdout(predicate::str::contains("Settings: 1"));
}

#[test]
fn test_check_reports_missing_default_file() {
    let tmp = TempDir::new().expect("tmp");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.current_dir(tmp.path()).arg("check");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed loading settings from config/settings.yml"));
}

#[test]
fn test_show_prints_yaml_summary() {
    let tmp = TempDir::new().expect("tmp");
    let path = write_settings(
        &tmp,
        "version: '1.2'\nlogger:\n  threshold: error\nsettings:\n  retries: 3\n",
    );

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.arg("show").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("threshold: error"))
        .stdout(predicate::str::contains("retries: 3"))
        .stdout(predicate::str::contains("flavor: default"));
}

#[test]
fn test_show_verbose_clears_threshold() {
    let tmp = TempDir::new().expect("tmp");
    let path = write_settings(&tmp, "logger:\n  threshold: error\n");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.args(["show", "--json", "--verbose"]).arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"threshold\": null"))
        .stdout(predicate::str::contains("\"verbose\": true"));
}

#[test]
fn test_show_forwards_application_arguments() {
    let tmp = TempDir::new().expect("tmp");
    let path = write_settings(
        &tmp,
        "arguments:\n  - name: [-r, --retries]\n    type: int\n",
    );

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.args(["show", "--json"]).arg(&path).args(["--", "--retries", "x"]);
    cmd.assert().failure().stderr(predicate::str::contains("not a valid integer"));
}

#[test]
fn test_check_demo_settings() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clikit"));
    cmd.args(["check", "demos/config/settings.yml", "--", "input.txt"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cache: line"))
        .stdout(predicate::str::contains("Settings: 3"));
}
