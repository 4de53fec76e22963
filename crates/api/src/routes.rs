use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    handlers::{AppState, auth, health, tokens},
    middleware::{logging_middleware, require_access_token},
};

/// Create router with state and middleware applied
///
/// Applies the access-token middleware only to protected routes, leaving the
/// auth endpoints themselves (register/login/refresh/logout) public — their
/// payloads carry whatever credential they need.
pub fn create_router_with_state(state: AppState) -> axum::Router {
    // Routes that need a verified, unrevoked access token
    let protected = Router::new()
        .route("/identity/v1/users/me", get(auth::me))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state.clone(), require_access_token));

    Router::new()
        // Health check endpoints (no authentication)
        .route("/livez", get(health::livez_handler))
        .route("/readyz", get(health::readyz_handler))
        .route("/healthz", get(health::healthz_handler))
        // Authentication endpoints
        .route("/identity/v1/auth/register", post(auth::register))
        .route("/identity/v1/auth/register/verify", post(auth::register_verify))
        .route("/identity/v1/auth/login", post(auth::login))
        .route("/identity/v1/auth/login/verify", post(auth::login_verify))
        .route("/identity/v1/auth/logout", post(auth::logout))
        // Token refresh endpoint (public, refresh token provides authentication)
        .route("/identity/v1/tokens/refresh", post(tokens::refresh))
        .with_state(state)
        .merge(protected)
        // Add logging middleware to log all requests
        .layer(middleware::from_fn(logging_middleware))
}
