use axum::{Json, extract::State};
use gramstay_identity_types::dto::{RefreshRequest, TokenPairInfo};

use crate::{
    handlers::auth::AppState,
    response::{ApiResponse, ApiResult, success},
};

/// Exchange a refresh token for a new credential pair
///
/// POST /identity/v1/tokens/refresh
///
/// Public route: the refresh token provides the authentication. The
/// presented session ID is consumed; the new pair carries a fresh one.
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<TokenPairInfo>>> {
    let pair = state.auth_service().refresh(&payload.token).await?;
    Ok(success("Token refreshed", TokenPairInfo::from(pair)))
}
