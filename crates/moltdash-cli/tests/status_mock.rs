//! `moltdash status` against a mock dashboard server.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn status_body() -> serde_json::Value {
    json!({
        "running": true,
        "uptime_hours": 2.5,
        "total_actions": 40,
        "successful_actions": 38,
        "success_rate": 95.0,
        "last_activity": null,
        "rate_limits": {
            "reset_date": "2026-10-18",
            "comments": {"used": 3, "limit": 50, "remaining": 47, "can_comment": true, "next_available": "now"},
            "posts": {"can_post": true, "next_available": "now", "cooldown_minutes": 30, "last_post": null}
        }
    })
}

#[tokio::test]
async fn test_status_prints_table() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .env_remove("RUST_LOG")
        .args(["--url", &server.uri(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2h 30m"))
        .stdout(predicate::str::contains("3/50 (6%), 47 left"))
        .stdout(predicate::str::contains("2026-10-18"));
}

#[tokio::test]
async fn test_status_json_uses_env_url() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;

    let output = cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .env("MOLTDASH_URL", server.uri())
        .args(["status", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["total_actions"], 40);
    assert_eq!(value["rate_limits"]["comments"]["remaining"], 47);
}

#[tokio::test]
async fn test_status_server_error_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "bot offline"})))
        .mount(&server)
        .await;

    cargo_bin_cmd!("moltdash")
        .env("MOLTDASH_HOME", home.path())
        .args(["--url", &server.uri(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch status"))
        .stderr(predicate::str::contains("bot offline"));
}
