use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("askgem")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("theme"));
}

#[test]
fn test_ask_help_shows_output_flags() {
    cargo_bin_cmd!("askgem")
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--fragment"))
        .stdout(predicate::str::contains("--no-prewrap"));
}

#[test]
fn test_open_requires_output() {
    cargo_bin_cmd!("askgem")
        .args(["ask", "hello", "--open"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("askgem")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
