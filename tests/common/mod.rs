//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use solidario::models::User;
use solidario::moderation::UserRole;
use solidario::store::Tokens;
use solidario::{ApiClient, SessionStore};
use url::Url;
use wiremock::MockServer;

pub async fn anonymous_client(server: &MockServer) -> Arc<ApiClient> {
    let store = SessionStore::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory store");
    let base = Url::parse(&server.uri()).expect("Mock server URI");
    Arc::new(ApiClient::new(base, store))
}

/// Client with a stored session using access token `a1` / refresh token `r1`
pub async fn logged_in_client(server: &MockServer, user: &User) -> Arc<ApiClient> {
    let client = anonymous_client(server).await;
    client
        .store()
        .save(
            &Tokens {
                access_token: "a1".to_string(),
                refresh_token: "r1".to_string(),
            },
            Some(user),
        )
        .await
        .expect("Failed to save session");
    client
}

pub fn user(role: UserRole) -> User {
    User {
        id: 100,
        name: "Marta".to_string(),
        email: "marta@example.org".to_string(),
        role,
        institution_id: None,
        region_id: Some(1),
    }
}

pub fn campaign_json(id: i64, status: &str, ativa: bool) -> Value {
    json!({
        "id": id,
        "titulo": format!("Campanha {}", id),
        "status": status,
        "ativa": ativa
    })
}

pub fn envelope(items: Vec<Value>) -> Value {
    json!({ "data": items })
}
