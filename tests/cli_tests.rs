//! CLI integration tests for the `joigo` binary.
//!
//! Every test runs inside its own temp directory with a config that keeps
//! persisted state inside that directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn joigo(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("joigo").unwrap();
    cmd.current_dir(dir.path())
        .arg("--no-color")
        .env_remove("JOIGO_API_URL")
        .env_remove("VITE_API_URL")
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("JOIGO_LANGUAGE")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace(api_url: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("storage.json");
    fs::write(
        dir.path().join("joigo.toml"),
        format!(
            "[api]\nbase_url = \"{}\"\n\n[storage]\npath = {:?}\n",
            api_url,
            storage.display().to_string()
        ),
    )
    .unwrap();
    dir
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    joigo(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tours"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("wishlist"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    joigo(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("joigo"));
}

#[test]
fn test_unknown_currency_is_rejected() {
    let dir = TempDir::new().unwrap();
    joigo(&dir)
        .args(["init", "--currency", "EUR"])
        .assert()
        .failure();
}

// =============================================================================
// Init
// =============================================================================

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    joigo(&dir)
        .args(["init", "--api-url", "https://api.joigo.vn", "--currency", "VND"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("joigo.toml")).unwrap();
    assert!(written.contains("base_url = \"https://api.joigo.vn\""));
    assert!(written.contains("currency = \"VND\""));
    assert!(dir.path().join(".env.example").exists());

    joigo(&dir).arg("init").assert().failure();
    joigo(&dir).args(["init", "--force"]).assert().success();
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_shows_base_url() {
    let dir = workspace("http://127.0.0.1:9");
    joigo(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:9"));
}

#[test]
fn test_config_rejects_bad_url() {
    let dir = workspace("ftp://joigo.vn");
    joigo(&dir).args(["config", "--validate"]).assert().failure();
}

// =============================================================================
// Commands against a mocked backend
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_tours_list_filters_by_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Hơi thở Xứ Đoài", "price": 19, "type": "Tour gia đình",
             "destination": "Sơn Tây"},
            {"id": 2, "title": "Phố cổ về đêm", "price": 15, "type": "Ẩm thực",
             "destination": "Hoàn Kiếm"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tracking/visitor"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = workspace(&server.uri());
    let assert = tokio::task::spawn_blocking(move || {
        joigo(&dir)
            .args(["tours", "list", "--type", "Ẩm thực"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("Phố cổ về đêm"))
        .stdout(predicate::str::contains("Hơi thở Xứ Đoài").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bookings_require_sign_in() {
    let server = MockServer::start().await;
    let dir = workspace(&server.uri());
    let assert = tokio::task::spawn_blocking(move || joigo(&dir).arg("bookings").assert())
        .await
        .unwrap();
    assert.failure();
}
