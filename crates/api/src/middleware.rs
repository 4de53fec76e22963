use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use gramstay_identity_types::Error;

use crate::{handlers::auth::AppState, response::ApiError};

/// Context for authenticated requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject (account ID rendered as a string) from the verified token
    pub subject_id: String,
    /// Session ID from the verified token
    pub jti: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Access token middleware
///
/// Verifies the bearer token (signature, expiry, revocation) and attaches an
/// [`AuthContext`] to the request. Applied only to protected routes; the
/// auth endpoints themselves stay public.
pub async fn require_access_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| Error::auth("Missing bearer token"))?;

    let claims = state.auth_service().verify_active(token).await?;

    request.extensions_mut().insert(AuthContext { subject_id: claims.id, jti: claims.jti });

    Ok(next.run(request).await)
}

/// Request logging middleware
///
/// Logs method, path, response status, and latency for every request.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::*;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn trims_whitespace_around_token() {
        let headers = headers_with_auth("Bearer   abc  ");
        assert_eq!(extract_bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn rejects_wrong_scheme() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn rejects_empty_token() {
        let headers = headers_with_auth("Bearer ");
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn scheme_is_case_sensitive() {
        let headers = headers_with_auth("bearer abc");
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
