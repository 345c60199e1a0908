use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_no_patterns_prints_usage_and_fails() {
    Command::cargo_bin("filesentry")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("PATTERN"));
}

#[test]
fn test_flags_without_patterns_fail() {
    Command::cargo_bin("filesentry")
        .unwrap()
        .args(["-v", "-t", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATTERN"));
}

#[test]
fn test_invalid_mode_is_rejected() {
    Command::cargo_bin("filesentry")
        .unwrap()
        .args(["--mode", "threads", "log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scan mode"));
}

#[test]
fn test_invalid_rescan_policy_is_rejected() {
    Command::cargo_bin("filesentry")
        .unwrap()
        .args(["--rescan", "always", "log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rescan policy"));
}

#[test]
fn test_help_mentions_control_signals() {
    Command::cargo_bin("filesentry")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SIGUSR1"))
        .stdout(predicate::str::contains("SIGUSR2"));
}
