use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("calmmap")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("prefs"))
        .stdout(predicate::str::contains("org"));
}

#[test]
fn test_prefs_help_shows_subcommands() {
    cargo_bin_cmd!("calmmap")
        .args(["prefs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

#[test]
fn test_org_create_requires_type() {
    cargo_bin_cmd!("calmmap")
        .args(["org", "create", "--address", "Main st. 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--type"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("calmmap")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("calmmap"));
}
