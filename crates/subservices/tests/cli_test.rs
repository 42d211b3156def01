//! Integration tests for the `subservices` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions,
//! configuration handling and error reporting. Commands that get past
//! argument parsing point `--base-url` at a closed local port, and the
//! system keyring is switched off, so no request reaches the real API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `subservices` binary with env isolation.
///
/// Clears all `SUBSERVICES_*` env vars, disables the system keyring and
/// points config directories at `home` so tests never touch the user's real
/// configuration or stored tokens.
fn subservices_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("subservices");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("SUBSERVICES_NO_KEYRING", "1")
        .env_remove("SUBSERVICES_PROFILE")
        .env_remove("SUBSERVICES_TOKEN")
        .env_remove("SUBSERVICES_BASE_URL")
        .env_remove("SUBSERVICES_OUTPUT")
        .env_remove("SUBSERVICES_VERIFY_TLS")
        .env_remove("SUBSERVICES_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let home = tempfile::tempdir().unwrap();
    let cmd = subservices_cmd(home.path());
    (home, cmd)
}

/// Closed local port: anything that does get dispatched fails to connect.
const UNREACHABLE: &str = "http://127.0.0.1:1/api/v1/";

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_home, mut cmd) = isolated();
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--help").assert().success().stdout(
        predicate::str::contains("sub.services")
            .and(predicate::str::contains("instances"))
            .and(predicate::str::contains("whitelist"))
            .and(predicate::str::contains("locations")),
    );
}

#[test]
fn test_version_flag() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("subservices"));
}

#[test]
fn test_base_url_is_hidden_from_help() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--base-url").not());
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let (_home, mut cmd) = isolated();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let (_home, mut cmd) = isolated();
    cmd.args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let (_home, mut cmd) = isolated();
    let output = cmd.arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let (_home, mut cmd) = isolated();
    let output = cmd.args(["-o", "xml", "user"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_missing_token_is_auth_error() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["--base-url", UNREACHABLE, "instances", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    let text = combined_output(&output);
    assert!(text.contains("No API token"), "unexpected output:\n{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["--base-url", UNREACHABLE, "--profile", "ghost", "user"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("ghost"));
}

#[test]
fn test_order_requires_location_and_name() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["--token", "t", "--base-url", UNREACHABLE])
        .args(["instances", "order", "--name", "db"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--location"));
}

#[test]
fn test_request_param_needs_key_value() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["--token", "t", "--base-url", UNREACHABLE])
        .args(["request", "GET", "user", "-P", "novalue"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("key=value"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show_redacts_token() {
    let home = tempfile::tempdir().unwrap();

    subservices_cmd(home.path())
        .args(["--token", "super-secret", "config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Profile 'default' written"));

    subservices_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("****")
                .and(predicate::str::contains("super-secret").not())
                .and(predicate::str::contains("[profiles.default]")),
        );
}

#[test]
fn test_config_init_with_token_env_and_use() {
    let home = tempfile::tempdir().unwrap();

    subservices_cmd(home.path())
        .args(["--profile", "work", "config", "init", "--token-env", "WORK_TOKEN"])
        .assert()
        .success();

    subservices_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("work *"));

    subservices_cmd(home.path())
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""token_env": "WORK_TOKEN""#));

    let output = subservices_cmd(home.path())
        .args(["config", "use", "ghost"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("Available profiles: work"));
}

#[test]
fn test_config_init_without_token_fails_non_interactively() {
    let (_home, mut cmd) = isolated();
    let output = cmd.args(["config", "init"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--token"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let (_home, mut cmd) = isolated();
    let output = cmd.args(["config", "set", "colour", "red"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("unknown config key"));
}

#[test]
fn test_keyring_switch_blocks_keyring_storage() {
    let home = tempfile::tempdir().unwrap();

    let output = subservices_cmd(home.path())
        .args(["--token", "super-secret", "config", "init", "--keyring"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("SUBSERVICES_NO_KEYRING"));

    subservices_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}
