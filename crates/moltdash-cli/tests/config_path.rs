//! `moltdash config` against an isolated `MOLTDASH_HOME`.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_lives_under_moltdash_home() {
    let home = tempdir().unwrap();
    let expected = home.path().join("config.toml");

    cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn test_config_init_writes_dashboard_defaults() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(home.path().join("config.toml")).unwrap();
    for key in [
        "base_url = \"http://localhost:5000\"",
        "reconnect_delay_secs = 5",
        "poll_interval_secs = 5",
        "feed_limit = 200",
        "agent_name = \"Peter\"",
    ] {
        assert!(contents.contains(key), "missing `{key}` in template");
    }
}

#[test]
fn test_config_init_keeps_existing_settings() {
    let home = tempdir().unwrap();
    let config_path = home.path().join("config.toml");
    fs::write(&config_path, "agent_name = \"Molty\"\nfeed_limit = 50\n").unwrap();

    cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert_eq!(contents, "agent_name = \"Molty\"\nfeed_limit = 50\n");
}

#[test]
fn test_invalid_feed_limit_is_reported() {
    let home = tempdir().unwrap();
    fs::write(home.path().join("config.toml"), "feed_limit = \"many\"").unwrap();

    cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
