use axum::{Json, extract::State, http::StatusCode};
use gramstay_identity_storage::StorageBackend;
use serde_json::{Value, json};

use crate::handlers::auth::AppState;

/// Liveness probe
///
/// GET /livez — always 200 while the process is serving requests.
pub async fn livez_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe
///
/// GET /readyz — 200 when the storage backend answers, 503 otherwise.
pub async fn readyz_handler(State(state): State<AppState>) -> StatusCode {
    match state.storage.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        },
    }
}

/// Health summary
///
/// GET /healthz — JSON status document for humans and dashboards.
pub async fn healthz_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let storage_ok = state.storage.health_check().await.is_ok();

    let status = if storage_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "status": if storage_ok { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": if storage_ok { "ok" } else { "unreachable" },
    });

    (status, Json(body))
}
