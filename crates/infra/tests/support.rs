//! Shared fixtures for API client integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use storedesk_common::auth::MemoryCredentialStore;
use storedesk_infra::ApiClient;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_PATH: &str = "/token/refresh/";

/// Client against `server`, sharing `store` with the test
pub fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> Arc<ApiClient> {
    let client = ApiClient::builder()
        .base_url(server.uri())
        .timeout(Duration::from_secs(2))
        .store(store)
        .build()
        .expect("client should build");
    Arc::new(client)
}

/// `GET route` answers `status` for requests bearing `token`
pub async fn mount_for_token(
    server: &MockServer,
    route: &str,
    token: &str,
    status: u16,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Refresh endpoint exchanging `refresh` for `access`, called exactly
/// `expected` times
pub async fn mount_refresh_ok(
    server: &MockServer,
    refresh: &str,
    access: &str,
    delay: Duration,
    expected: u64,
) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": access })).set_delay(delay),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// Refresh endpoint rejecting every refresh token
pub async fn mount_refresh_rejected(server: &MockServer, delay: Duration, expected: u64) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({
                    "detail": "Token is invalid or expired",
                    "code": "token_not_valid"
                }))
                .set_delay(delay),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// Refresh endpoint that must never be called
pub async fn forbid_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Number of refresh calls the server has seen
pub async fn refresh_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == REFRESH_PATH)
        .count()
}
