use bon::bon;
use chrono::{Duration, Utc};
use gramstay_identity_const::{ACCESS_TOKEN_TTL_SECONDS, REFRESH_TOKEN_TTL_SECONDS};
use gramstay_identity_types::{
    dto::TokenPairInfo,
    error::{Error, Result},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by both tokens of a pair
///
/// The access and refresh token of one issuance share the same subject id
/// and session id; only their expiry differs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: account ID rendered as a string
    pub id: String,
    /// Session ID (UUID), unique per issuance
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Seconds until this token expires, clamped at zero
    pub fn remaining_seconds(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(0) as u64
    }
}

/// An access/refresh credential pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Short-lived credential for authenticating requests
    pub access_token: String,
    /// Longer-lived credential used solely to mint a new pair
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairInfo {
    fn from(pair: TokenPair) -> Self {
        Self { access_token: pair.access_token, refresh_token: pair.refresh_token }
    }
}

/// Stateless HS256 signer/verifier for credential pairs
///
/// Tokens are never stored server-side; verification is signature + expiry
/// only. Revocation is layered on top by the jti denylist repository.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // EncodingKey/DecodingKey hold the signing secret and are not Debug;
        // redact them while surfacing the non-sensitive configuration.
        f.debug_struct("TokenIssuer")
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[bon]
impl TokenIssuer {
    /// Create a token issuer
    ///
    /// Both tokens are signed with the same secret. The access TTL must be
    /// strictly shorter than the refresh TTL; violating the pair-ordering
    /// invariant is a configuration error.
    #[builder(finish_fn = create)]
    pub fn new(
        #[builder(into)] secret: String,
        #[builder(default = Duration::seconds(ACCESS_TOKEN_TTL_SECONDS))] access_ttl: Duration,
        #[builder(default = Duration::seconds(REFRESH_TOKEN_TTL_SECONDS))] refresh_ttl: Duration,
    ) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::config("Token secret must not be empty"));
        }
        if access_ttl >= refresh_ttl {
            return Err(Error::config(
                "Access token TTL must be shorter than refresh token TTL",
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        })
    }

    /// Generate a fresh session ID (jti)
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Mint an access/refresh pair for a subject under one session ID
    ///
    /// Both claims share the same `iat`; expiries are `iat + access_ttl` and
    /// `iat + refresh_ttl` respectively.
    pub fn issue(&self, subject_id: &str, session_id: &str) -> Result<TokenPair> {
        let now = Utc::now();

        let access_claims = Claims {
            id: subject_id.to_string(),
            jti: session_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        let refresh_claims = Claims {
            exp: (now + self.refresh_ttl).timestamp(),
            ..access_claims.clone()
        };

        let header = Header::new(Algorithm::HS256);
        let access_token = encode(&header, &access_claims, &self.encoding_key)
            .map_err(|e| Error::internal(format!("Failed to sign access token: {e}")))?;
        let refresh_token = encode(&header, &refresh_claims, &self.encoding_key)
            .map_err(|e| Error::internal(format!("Failed to sign refresh token: {e}")))?;

        Ok(TokenPair { access_token, refresh_token })
    }

    /// Verify a token's signature and expiry, returning its claims
    ///
    /// Expired tokens and structurally invalid ones fail with distinct
    /// messages so the HTTP layer can tell the caller which it was.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
                Err(Error::auth("Token expired"))
            },
            Err(_) => Err(Error::auth("Invalid token")),
        }
    }
}
