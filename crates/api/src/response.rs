//! Response envelope and error mapping.
//!
//! Every endpoint answers with the same JSON shape: successes carry
//! `{status: "success", message, data}` and failures carry
//! `{status: "error", message}`. The HTTP status is derived from the error
//! taxonomy; server-side errors are logged and replaced by a generic
//! message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gramstay_identity_types::Error;
use serde::Serialize;
use serde_json::json;

/// Result type alias for handler functions
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Build a success envelope
pub fn success<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { status: "success", message: message.into(), data: Some(data) })
}

/// Build a success envelope with no data payload
pub fn success_message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse { status: "success", message: message.into(), data: None })
}

/// Error wrapper implementing `IntoResponse`
///
/// Domain errors pass through with their message and mapped status; anything
/// not meant for clients becomes a generic 500 with the original logged.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_client_facing() {
            self.0.to_string()
        } else {
            tracing::error!(error = %self.0, code = self.0.error_code(), "Request failed");
            "Internal server error".to_string()
        };

        (status, Json(json!({ "status": "error", "message": message }))).into_response()
    }
}
