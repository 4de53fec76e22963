use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Account;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct RegisterVerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct LoginVerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct RefreshRequest {
    pub token: String,
}

// ============================================================================
// Response payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AccountInfo {
    /// Account ID rendered as a string (matches the token subject claim)
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name,
            email: account.email,
            created_at: account.created_at,
        }
    }
}

/// Challenge acknowledgement returned by register/login start endpoints
#[derive(Debug, Serialize)]
pub struct ChallengeInfo {
    /// Seconds until the issued code stops being accepted
    pub expires_in_seconds: u64,

    /// The code itself. Present only in dev mode; production delivers the
    /// code out-of-band and never echoes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// The minted credential pair
#[derive(Debug, Serialize)]
pub struct TokenPairInfo {
    pub access_token: String,
    pub refresh_token: String,
}

/// Payload for successful registration/login verification
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub account: AccountInfo,
    pub tokens: TokenPairInfo,
}
