//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use sapim::clients::PaginationScheme;
use sapim::{BaseUrl, ClientConfig, ClientId, ClientSecret, ResourceClient, RetryPolicy};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// A retry policy with negligible delays.
pub fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1)).with_jitter(0.0)
}

/// Configuration pointing both the API and the token endpoint at `server`.
pub fn config_for(server: &MockServer, attempts: u32, page_size: u32) -> ClientConfig {
    config_with(server, &server.uri(), attempts, page_size, PaginationScheme::default())
}

pub fn config_with(
    server: &MockServer,
    base_url: &str,
    attempts: u32,
    page_size: u32,
    pagination: PaginationScheme,
) -> ClientConfig {
    ClientConfig::builder()
        .base_url(BaseUrl::new(base_url).unwrap())
        .token_url(BaseUrl::new(format!("{}/oauth/token", server.uri())).unwrap())
        .client_id(ClientId::new("client").unwrap())
        .client_secret(ClientSecret::new("secret").unwrap())
        .retry_policy(fast_policy(attempts))
        .page_size(page_size)
        .pagination(pagination)
        .build()
        .unwrap()
}

/// Mounts a token endpoint that hands out [`TOKEN`] for an hour.
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// A client against `server` with a working token endpoint.
pub async fn client_for(server: &MockServer, page_size: u32) -> ResourceClient {
    mount_token(server).await;
    ResourceClient::new(&config_for(server, 3, page_size)).unwrap()
}

/// A participant record as the server returns it.
pub fn participant(seq: usize) -> Value {
    json!({
        "payeeSeq": seq.to_string(),
        "payeeId": format!("P-{seq}"),
        "lastName": "Smith",
        "effectiveStartDate": "2024-01-01T00:00:00.000-08:00",
        "effectiveEndDate": "2200-01-01T00:00:00.000-08:00"
    })
}

pub fn participants(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(participant).collect()
}
