#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Integration tests for the OTP-gated registration and login endpoints.
//!
//! Drives the full flow through the HTTP router: challenge issue, code
//! validation, account creation, and the error taxonomy on every failure
//! path.

use axum::http::StatusCode;
use gramstay_identity_test_fixtures::{
    begin_registration, body_json, create_test_app, create_test_state, get_with_token,
    login_account, post_json, register_account,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_full_registration_flow() {
    let state = create_test_state();
    let app = create_test_app(state);

    let response = post_json(
        &app,
        "/identity/v1/auth/register",
        json!({ "name": "Asha Verma", "email": "asha@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["expires_in_seconds"], 300);
    let code = body["data"]["code"].as_str().expect("dev mode echoes the code").to_string();

    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "asha@example.com", "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["account"]["email"], "asha@example.com");
    assert_eq!(body["data"]["account"]["name"], "Asha Verma");
    assert!(body["data"]["tokens"]["access_token"].is_string());
    assert!(body["data"]["tokens"]["refresh_token"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_conflicts_before_any_code() {
    let state = create_test_state();
    let app = create_test_app(state);

    register_account(&app, "Asha", "taken@example.com").await;

    let response = post_json(
        &app,
        "/identity/v1/auth/register",
        json!({ "name": "Someone Else", "email": "taken@example.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_email_matching_is_case_insensitive() {
    let state = create_test_state();
    let app = create_test_app(state);

    register_account(&app, "Asha", "asha@example.com").await;

    // Same address, different case: still a conflict
    let response = post_json(
        &app,
        "/identity/v1/auth/register",
        json!({ "name": "Asha", "email": "Asha@Example.COM" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_validation_errors_name_the_field() {
    let state = create_test_state();
    let app = create_test_app(state);

    let response = post_json(
        &app,
        "/identity/v1/auth/register",
        json!({ "name": "", "email": "asha@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Name is required");

    let response = post_json(
        &app,
        "/identity/v1/auth/register",
        json!({ "name": "Asha", "email": "not-an-email" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/identity/v1/auth/login/verify",
        json!({ "email": "asha@example.com", "code": "12" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("6 digits"));
}

#[tokio::test]
async fn test_wrong_code_then_correct_code() {
    let state = create_test_state();
    let app = create_test_app(state);

    let code = begin_registration(&app, "Asha", "asha@example.com").await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "asha@example.com", "code": wrong }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid OTP");

    // The stored code survives a wrong guess
    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "asha@example.com", "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_guess_budget_destroys_pending_registration() {
    let state = create_test_state();
    let app = create_test_app(state);

    let code = begin_registration(&app, "Asha", "asha@example.com").await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    for _ in 0..4 {
        let response = post_json(
            &app,
            "/identity/v1/auth/register/verify",
            json!({ "email": "asha@example.com", "code": wrong }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid OTP");
    }

    // Fifth wrong guess spends the budget
    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "asha@example.com", "code": wrong }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Too many failed attempts"));

    // The pending registration is gone with the challenge
    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "asha@example.com", "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_without_pending_registration() {
    let state = create_test_state();
    let app = create_test_app(state);

    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "nobody@example.com", "code": "123456" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("not found or expired"));
}

#[tokio::test]
async fn test_reregistration_overwrites_prior_challenge() {
    let state = create_test_state();
    let app = create_test_app(state);

    let first = begin_registration(&app, "Asha", "asha@example.com").await;
    let second = begin_registration(&app, "Asha", "asha@example.com").await;

    if first != second {
        let response = post_json(
            &app,
            "/identity/v1/auth/register/verify",
            json!({ "email": "asha@example.com", "code": first }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid OTP");
    }

    let response = post_json(
        &app,
        "/identity/v1/auth/register/verify",
        json!({ "email": "asha@example.com", "code": second }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let state = create_test_state();
    let app = create_test_app(state);

    let response =
        post_json(&app, "/identity/v1/auth/login", json!({ "email": "ghost@example.com" })).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Account not found");
}

#[tokio::test]
async fn test_full_login_flow_and_me_endpoint() {
    let state = create_test_state();
    let app = create_test_app(state);

    register_account(&app, "Asha", "asha@example.com").await;
    let auth = login_account(&app, "asha@example.com").await;

    let access_token = auth["tokens"]["access_token"].as_str().unwrap();
    let response = get_with_token(&app, "/identity/v1/users/me", access_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "asha@example.com");
    assert_eq!(body["data"]["id"], auth["account"]["id"]);
}

#[tokio::test]
async fn test_login_code_is_single_use() {
    let state = create_test_state();
    let app = create_test_app(state);

    register_account(&app, "Asha", "asha@example.com").await;

    let response =
        post_json(&app, "/identity/v1/auth/login", json!({ "email": "asha@example.com" })).await;
    let body = body_json(response).await;
    let code = body["data"]["code"].as_str().unwrap().to_string();

    let response = post_json(
        &app,
        "/identity/v1/auth/login/verify",
        json!({ "email": "asha@example.com", "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Entry was deleted on success; replaying the code fails
    let response = post_json(
        &app,
        "/identity/v1/auth/login/verify",
        json!({ "email": "asha@example.com", "code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "OTP expired or not found");
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let state = create_test_state();
    let app = create_test_app(state);

    // No token at all
    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/identity/v1/users/me")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let response = get_with_token(&app, "/identity/v1/users/me", "not-a-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_logout_revokes_the_session() {
    let state = create_test_state();
    let app = create_test_app(state);

    let auth = register_account(&app, "Asha", "asha@example.com").await;
    let access_token = auth["tokens"]["access_token"].as_str().unwrap();

    // Logout succeeds with the access token
    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/identity/v1/auth/logout")
                .header("authorization", format!("Bearer {access_token}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The revoked session no longer passes the middleware
    let response = get_with_token(&app, "/identity/v1/users/me", access_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Token has been revoked");
}

#[tokio::test]
async fn test_logout_without_bearer_token() {
    let state = create_test_state();
    let app = create_test_app(state);

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/identity/v1/auth/logout")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
