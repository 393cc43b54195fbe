//! Test helpers for integration tests.
//!
//! Provides store fixtures for both backends and web test servers with fast
//! password-hash settings.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{json, Value};

use mmllo::config::AuthConfig;
use mmllo::docstore::DocDatabase;
use mmllo::store::{document_stores, relational_stores, Stores};
use mmllo::{create_router, Database};

/// Auth settings for tests: throwaway secret, cheap Argon2 cost.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key-for-testing-only".to_string(),
        token_validity_days: 7,
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
    }
}

/// Stores over an in-memory relational database.
pub async fn relational_fixture() -> Stores {
    let db = Database::open_in_memory()
        .await
        .expect("failed to open test database");
    relational_stores(&db)
}

/// Stores over an in-memory document database.
pub async fn document_fixture() -> Stores {
    let doc = DocDatabase::open_in_memory()
        .await
        .expect("failed to open test document store");
    document_stores(doc)
}

/// Both backend fixtures, for tests that assert backend-agnostic behavior.
pub async fn both_backends() -> Vec<Stores> {
    vec![relational_fixture().await, document_fixture().await]
}

/// Test server over the relational backend.
pub async fn create_test_server() -> TestServer {
    let stores = relational_fixture().await;
    let router = create_router(stores, test_auth_config(), &[]);
    TestServer::new(router).expect("failed to create test server")
}

/// Test server over the document backend.
pub async fn create_document_test_server() -> TestServer {
    let stores = document_fixture().await;
    let router = create_router(stores, test_auth_config(), &[]);
    TestServer::new(router).expect("failed to create test server")
}

/// Register a user and return the response body (token + user).
pub async fn register_user(server: &TestServer, username: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Register a user and return just the bearer token.
pub async fn register_and_token(server: &TestServer, username: &str) -> String {
    register_user(server, username).await["token"]
        .as_str()
        .expect("token missing from register response")
        .to_string()
}

/// Create a board and return its body.
pub async fn create_board(server: &TestServer, token: &str, title: &str) -> Value {
    let response = server
        .post("/api/boards")
        .authorization_bearer(token)
        .json(&json!({"title": title}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["board"].clone()
}

/// Create a list on a board and return its body.
pub async fn create_list(server: &TestServer, token: &str, board_id: &Value, title: &str) -> Value {
    let response = server
        .post(&format!("/api/lists/board/{}", id_str(board_id)))
        .authorization_bearer(token)
        .json(&json!({"title": title}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["list"].clone()
}

/// Create a card on a list and return its body.
pub async fn create_card(server: &TestServer, token: &str, list_id: &Value, title: &str) -> Value {
    let response = server
        .post(&format!("/api/cards/list/{}", id_str(list_id)))
        .authorization_bearer(token)
        .json(&json!({"title": title}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["card"].clone()
}

/// Render a JSON id value (number or string) as a path segment.
pub fn id_str(id: &Value) -> String {
    match id {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => panic!("unexpected id value: {other}"),
    }
}
