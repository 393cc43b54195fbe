//! Web API authentication tests.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{create_document_test_server, create_test_server, register_user};

#[tokio::test]
async fn test_register_success() {
    let server = create_test_server().await;

    let body = register_user(&server, "testuser").await;
    assert_eq!(body["message"], "User created successfully");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "testuser");
    assert_eq!(body["user"]["email"], "testuser@example.com");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let server = create_test_server().await;
    register_user(&server, "testuser").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "testuser",
            "email": "other@example.com",
            "password": "password456",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Username already taken");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = create_test_server().await;
    register_user(&server, "testuser").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "otheruser",
            "email": "testuser@example.com",
            "password": "password456",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "",
            "email": "x@example.com",
            "password": "password123",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_short_password() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "testuser",
            "email": "testuser@example.com",
            "password": "short",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let server = create_test_server().await;
    register_user(&server, "testuser").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "testuser",
            "password": "password123",
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "testuser");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = create_test_server().await;
    register_user(&server, "testuser").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "testuser",
            "password": "wrongpassword",
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user_same_message() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "ghost",
            "password": "password123",
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_with_bearer_token() {
    let server = create_test_server().await;
    let body = register_user(&server, "testuser").await;
    let token = body["token"].as_str().unwrap();

    let response = server
        .get("/api/auth/me")
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "testuser");
}

#[tokio::test]
async fn test_me_with_cookie() {
    let mut server = create_test_server().await;
    server.save_cookies();

    // Registration sets the token cookie; no bearer header needed after.
    register_user(&server, "testuser").await;
    let response = server.get("/api/auth/me").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "testuser");
}

#[tokio::test]
async fn test_me_without_token() {
    let server = create_test_server().await;
    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_garbage_token() {
    let server = create_test_server().await;
    let response = server
        .get("/api/auth/me")
        .authorization_bearer("not.a.token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let mut server = create_test_server().await;
    server.save_cookies();
    register_user(&server, "testuser").await;

    let response = server.post("/api/auth/logout").await;
    response.assert_status_ok();

    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_flow_on_document_backend() {
    let server = create_document_test_server().await;
    let body = register_user(&server, "docuser").await;
    // Document ids are opaque strings.
    assert!(body["user"]["id"].is_string());

    let token = body["token"].as_str().unwrap();
    let response = server
        .get("/api/auth/me")
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
