use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn name_command_prints_canonical_uri() {
    Command::cargo_bin("ndn-cli")
        .unwrap()
        .args(["name", "/a/b/c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/a/b/c"));
}

#[test]
fn name_command_rejects_malformed_uri() {
    Command::cargo_bin("ndn-cli")
        .unwrap()
        .args(["name", "not-a-uri-%zz"])
        .assert()
        .failure();
}

#[test]
fn scheduler_command_drains_every_scheduled_event() {
    Command::cargo_bin("ndn-cli")
        .unwrap()
        .args(["scheduler", "--count", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("poll() ran 3 events"));
}

#[test]
fn store_command_reports_insertions() {
    Command::cargo_bin("ndn-cli")
        .unwrap()
        .args(["store", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("store now holds"));
}

#[test]
fn config_command_prints_defaults_without_a_config_file() {
    Command::cargo_bin("ndn-cli")
        .unwrap()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("store_capacity"));
}
