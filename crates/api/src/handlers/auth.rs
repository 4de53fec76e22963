use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
};
use bon::Builder;
use gramstay_identity_config::Config;
use gramstay_identity_core::{AuthService, EmailService, TokenIssuer};
use gramstay_identity_storage::Backend;
use gramstay_identity_types::{
    Error,
    dto::{
        AccountInfo, AuthPayload, ChallengeInfo, LoginRequest, LoginVerifyRequest,
        RegisterRequest, RegisterVerifyRequest,
    },
};

use crate::{
    middleware::{AuthContext, extract_bearer_token},
    response::{ApiResponse, ApiResult, success, success_message},
};

/// Shared application state
///
/// Every collaborator is constructed once at startup and injected here; the
/// flow itself is rebuilt per request over the shared backend.
#[derive(Clone, Builder)]
pub struct AppState {
    pub storage: Arc<Backend>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenIssuer>,
    pub email_service: Option<Arc<EmailService>>,
}

impl AppState {
    /// Build the auth flow over this state's collaborators
    pub fn auth_service(&self) -> AuthService<Backend> {
        AuthService::builder()
            .storage((*self.storage).clone())
            .tokens(Arc::clone(&self.tokens))
            .maybe_email_service(self.email_service.clone())
            .build()
    }

    /// Whether one-time codes may be echoed in HTTP responses
    fn echo_codes(&self) -> bool {
        self.config.is_dev_mode()
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Start a registration
///
/// POST /identity/v1/auth/register
///
/// Checks for an existing account (409 before any code is issued), stashes
/// the pending profile, and challenges the email address.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<ChallengeInfo>>> {
    let challenge = state.auth_service().begin_registration(&payload.name, &payload.email).await?;

    let info = ChallengeInfo {
        expires_in_seconds: challenge.expires_in_seconds,
        code: state.echo_codes().then_some(challenge.code),
    };

    Ok(success("Verification code sent", info))
}

/// Complete a registration
///
/// POST /identity/v1/auth/register/verify
pub async fn register_verify(
    State(state): State<AppState>,
    Json(payload): Json<RegisterVerifyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthPayload>>)> {
    let (account, pair) =
        state.auth_service().complete_registration(&payload.email, &payload.code).await?;

    let payload = AuthPayload { account: AccountInfo::from(account), tokens: pair.into() };
    Ok((StatusCode::CREATED, success("Registration successful", payload)))
}

// ============================================================================
// Login
// ============================================================================

/// Start a login
///
/// POST /identity/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<ChallengeInfo>>> {
    let challenge = state.auth_service().begin_login(&payload.email).await?;

    let info = ChallengeInfo {
        expires_in_seconds: challenge.expires_in_seconds,
        code: state.echo_codes().then_some(challenge.code),
    };

    Ok(success("Verification code sent", info))
}

/// Complete a login
///
/// POST /identity/v1/auth/login/verify
pub async fn login_verify(
    State(state): State<AppState>,
    Json(payload): Json<LoginVerifyRequest>,
) -> ApiResult<Json<ApiResponse<AuthPayload>>> {
    let (account, pair) =
        state.auth_service().complete_login(&payload.email, &payload.code).await?;

    let payload = AuthPayload { account: AccountInfo::from(account), tokens: pair.into() };
    Ok(success("Login successful", payload))
}

// ============================================================================
// Session
// ============================================================================

/// Revoke the presented token's session
///
/// POST /identity/v1/auth/logout
///
/// Public route: the bearer token itself is the credential being retired,
/// so verification happens inside the flow rather than in middleware.
pub async fn logout(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<ApiResponse<()>>> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| Error::auth("Missing bearer token"))?;

    state.auth_service().logout(token).await?;
    Ok(success_message("Session revoked"))
}

/// Current account profile
///
/// GET /identity/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<AccountInfo>>> {
    let account = state.auth_service().get_account(&auth.subject_id).await?;
    Ok(success("Account", AccountInfo::from(account)))
}
