//! CLI integration tests for meme-post

use assert_cmd::Command;
use predicates::prelude::*;

/// Build a command with every MEMECAST_* variable cleared so the run
/// never picks up credentials from the host environment.
fn bare_command() -> Command {
    let mut cmd = Command::cargo_bin("meme-post").unwrap();
    for var in [
        "MEMECAST_BLUESKY_HANDLE",
        "MEMECAST_BLUESKY_APP_PASSWORD",
        "MEMECAST_BLUESKY_SERVICE",
        "MEMECAST_API_BASE_URL",
        "MEMECAST_API_KEY",
        "MEMECAST_TIMEOUT_SECS",
        "MEMECAST_FALLBACK_TEXT",
        "MEMECAST_ON_IMAGE_FAILURE",
        "MEMECAST_LOG_FORMAT",
        "MEMECAST_LOG_LEVEL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_describes_flags() {
    let mut cmd = Command::cargo_bin("meme-post").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_missing_config_fails_with_error_on_stderr() {
    let mut cmd = bare_command();

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains(
            "Missing required environment variable",
        ));
}

#[test]
fn test_missing_config_names_first_missing_variable() {
    let mut cmd = bare_command();

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("MEMECAST_BLUESKY_HANDLE"));
}

#[test]
fn test_no_output_on_stdout_when_config_fails() {
    let output = bare_command().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.trim().is_empty());
}

#[test]
fn test_unknown_format_value_is_rejected() {
    let mut cmd = Command::cargo_bin("meme-post").unwrap();

    cmd.args(["--format", "yaml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    let mut cmd = Command::cargo_bin("meme-post").unwrap();

    cmd.arg("--frobnicate").assert().failure().code(2);
}
