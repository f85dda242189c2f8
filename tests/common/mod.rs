//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mocks;

use joigo::storage::{KeyValueStore, MemoryStore};
use joigo::{ApiClient, AppState, IdentityProvider, JoigoConfig};
use mocks::FakeIdentity;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub const EMAIL: &str = "lan@example.com";
pub const PASSWORD: &str = "hunter22";
pub const USER_ID: &str = "u-lan";

pub fn bearer() -> String {
    format!("Bearer token-{}", USER_ID)
}

pub fn fake_identity() -> Arc<FakeIdentity> {
    Arc::new(FakeIdentity::new(EMAIL, PASSWORD, USER_ID))
}

/// App wired to a mock backend, an in-memory store and the fake identity.
pub fn app(server: &MockServer) -> AppState {
    app_with(server, fake_identity(), Arc::new(MemoryStore::new()))
}

pub fn app_with(
    server: &MockServer,
    provider: Arc<dyn IdentityProvider>,
    storage: Arc<dyn KeyValueStore>,
) -> AppState {
    AppState::with_parts(
        JoigoConfig::default(),
        ApiClient::with_base_url(server.uri()),
        provider,
        storage,
    )
}

/// Same as [`app`] with the user already signed in.
pub async fn signed_in_app(server: &MockServer) -> AppState {
    let app = app(server);
    app.auth.init().await;
    app.auth
        .sign_in(EMAIL, PASSWORD)
        .await
        .expect("fake sign-in");
    app
}

/// A tour row as the backend sends it.
pub fn tour_json(id: i64, title: &str, tour_type: Value, destination: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "title_en": null,
        "image": format!("https://img.joigo.vn/{}.jpg", id),
        "images": null,
        "rating": 4.8,
        "reviews": 120,
        "price": 19,
        "type": tour_type,
        "departure": "Hà Nội",
        "destination": destination,
        "transportation": "Ô tô",
        "description": format!("Trải nghiệm {}", title),
    })
}

/// Three tours covering single and multi-tag types.
pub fn catalog_json() -> Value {
    json!([
        tour_json(1, "Hơi thở Xứ Đoài", json!("Tour gia đình"), "Sơn Tây"),
        tour_json(2, "Làng gốm Bát Tràng", json!(["Làng nghề", "Tour gia đình"]), "Bát Tràng"),
        tour_json(3, "Phố cổ về đêm", json!("Ẩm thực"), "Hoàn Kiếm"),
    ])
}
