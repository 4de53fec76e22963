// Test fixtures are allowed to use unwrap/expect for clear failure messages
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Test fixtures and utilities for Gramstay Identity integration tests.
//!
//! This crate provides shared test helpers to eliminate duplication across
//! integration tests. All functions are designed to work with the Axum-based
//! API and the in-memory storage backend.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gramstay_identity_test_fixtures::{create_test_state, create_test_app, register_account};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let state = create_test_state();
//!     let app = create_test_app(state);
//!
//!     let auth = register_account(&app, "Test User", "test@example.com").await;
//!     let access_token = auth["tokens"]["access_token"].as_str().unwrap();
//!     // Use the token for authenticated requests...
//! }
//! ```
//!
//! The test state runs in dev mode, so challenge endpoints echo the
//! generated code in their response payload and the flow helpers can drive
//! the whole exchange over HTTP without peeking into storage.

#![deny(unsafe_code)]

use std::sync::Arc;

use axum::{body::Body, http::Request};
use gramstay_identity_api::{AppState, create_router_with_state};
use gramstay_identity_config::Config;
use gramstay_identity_core::{IdGenerator, TokenIssuer};
use gramstay_identity_storage::Backend;
use serde_json::{Value, json};
use tower::ServiceExt;

/// HS256 secret used by all test states. Long enough to pass validation,
/// fixed so tests can decode the tokens they receive.
pub const TEST_TOKEN_SECRET: &str = "test-secret-test-secret-test-secret!";

/// Creates a test AppState with in-memory storage backend.
///
/// The state is configured for testing with:
/// - Memory backend for data persistence
/// - Dev mode enabled (codes echoed in responses)
/// - No email service
///
/// # Returns
///
/// A fully configured AppState ready for use in integration tests.
pub fn create_test_state() -> AppState {
    let _ = IdGenerator::init(1);

    let config = Config::builder().dev_mode(true).token_secret(TEST_TOKEN_SECRET).build();
    config.validate().expect("test config should validate");

    let tokens =
        TokenIssuer::builder().secret(TEST_TOKEN_SECRET).create().expect("valid test issuer");

    AppState::builder()
        .storage(Arc::new(Backend::memory()))
        .config(Arc::new(config))
        .tokens(Arc::new(tokens))
        .build()
}

/// Creates a fully configured Axum router with all middleware and routes.
///
/// Use with `tower::ServiceExt::oneshot` to drive test requests.
pub fn create_test_app(state: AppState) -> axum::Router {
    create_router_with_state(state)
}

/// Parses an HTTP response body as JSON.
///
/// # Panics
///
/// Panics if the body cannot be read or parsed as valid JSON.
pub async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends a JSON POST request to the app.
pub async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: Value,
) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Sends a GET request with a bearer token.
pub async fn get_with_token(
    app: &axum::Router,
    uri: &str,
    token: &str,
) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Starts a registration and returns the echoed one-time code.
///
/// # Panics
///
/// Panics if the request fails or the dev-mode code is missing.
pub async fn begin_registration(app: &axum::Router, name: &str, email: &str) -> String {
    use axum::http::StatusCode;

    let response = post_json(
        app,
        "/identity/v1/auth/register",
        json!({ "name": name, "email": email }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK, "Registration start should succeed");
    let json = body_json(response).await;
    json["data"]["code"].as_str().expect("dev mode should echo the code").to_string()
}

/// Registers an account end-to-end and returns the auth payload
/// (`{account, tokens}`).
///
/// # Panics
///
/// Panics if any step of the flow fails.
pub async fn register_account(app: &axum::Router, name: &str, email: &str) -> Value {
    use axum::http::StatusCode;

    let code = begin_registration(app, name, email).await;

    let response = post_json(
        app,
        "/identity/v1/auth/register/verify",
        json!({ "email": email, "code": code }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED, "Registration verify should succeed");
    let json = body_json(response).await;
    json["data"].clone()
}

/// Logs an existing account in end-to-end and returns the auth payload.
///
/// # Panics
///
/// Panics if any step of the flow fails.
pub async fn login_account(app: &axum::Router, email: &str) -> Value {
    use axum::http::StatusCode;

    let response = post_json(app, "/identity/v1/auth/login", json!({ "email": email })).await;
    assert_eq!(response.status(), StatusCode::OK, "Login start should succeed");
    let json = body_json(response).await;
    let code = json["data"]["code"].as_str().expect("dev mode should echo the code").to_string();

    let response = post_json(
        app,
        "/identity/v1/auth/login/verify",
        json!({ "email": email, "code": code }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK, "Login verify should succeed");
    let json = body_json(response).await;
    json["data"].clone()
}
