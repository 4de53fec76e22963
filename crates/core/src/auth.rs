use std::sync::Arc;

use bon::bon;
use chrono::Duration;
use gramstay_identity_const::{OTP_TTL_SECONDS, PENDING_REGISTRATION_TTL_SECONDS};
use gramstay_identity_storage::StorageBackend;
use gramstay_identity_types::{
    entities::{
        Account, ChallengeOutcome, OtpChallenge, PendingRegistration, normalize_email,
        validate_code_format, validate_email,
    },
    error::{Error, Result},
};

use crate::{
    email::{EmailService, EmailTemplate, OtpEmailTemplate},
    id::IdGenerator,
    otp::OtpStore,
    repository::{AccountRepository, RevokedJtiRepository},
    token::{Claims, TokenIssuer, TokenPair},
};

/// Acknowledgement of an issued challenge
///
/// Carries the code back to the caller; the HTTP layer decides whether it
/// may be echoed (dev mode only) or must stay out-of-band.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    /// The generated code
    pub code: String,
    /// Seconds until the code stops being accepted
    pub expires_in_seconds: u64,
}

/// The registration/login/refresh flow
///
/// All collaborators are injected at construction: the storage backend, the
/// token issuer, and the optional email service. There is no global state;
/// handlers build one per request over the shared backend.
pub struct AuthService<S: StorageBackend> {
    storage: S,
    accounts: AccountRepository<S>,
    revoked: RevokedJtiRepository<S>,
    otp: OtpStore<S>,
    tokens: Arc<TokenIssuer>,
    email_service: Option<Arc<EmailService>>,
    otp_ttl: Duration,
    pending_ttl: Duration,
}

#[bon]
impl<S: StorageBackend> AuthService<S> {
    /// Build an auth service over a storage backend and token issuer
    #[builder]
    pub fn new(
        storage: S,
        tokens: Arc<TokenIssuer>,
        email_service: Option<Arc<EmailService>>,
        #[builder(default = Duration::seconds(OTP_TTL_SECONDS as i64))] otp_ttl: Duration,
        #[builder(default = Duration::seconds(PENDING_REGISTRATION_TTL_SECONDS as i64))]
        pending_ttl: Duration,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(storage.clone()),
            revoked: RevokedJtiRepository::new(storage.clone()),
            otp: OtpStore::builder().storage(storage.clone()).ttl(otp_ttl).build(),
            storage,
            tokens,
            email_service,
            otp_ttl,
            pending_ttl,
        }
    }

    /// Storage key for a pending registration
    fn pending_key(email: &str) -> Vec<u8> {
        format!("pending:{email}").into_bytes()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Start a registration: stash the profile and challenge the email
    ///
    /// Rejects with a conflict before any code is issued when the email
    /// already has an account. A repeated request overwrites the previous
    /// pending entry wholesale (profile and code together).
    pub async fn begin_registration(&self, name: &str, email: &str) -> Result<IssuedChallenge> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Name is required"));
        }
        let email = normalize_email(email);
        validate_email(&email)?;

        if self.accounts.get_by_email(&email).await?.is_some() {
            return Err(Error::already_exists("An account with this email already exists"));
        }

        let code = OtpChallenge::generate_code();
        let pending =
            PendingRegistration::new(name.clone(), email.clone(), OtpChallenge::new(code.clone()));
        self.write_pending(&pending, self.pending_ttl).await?;

        self.deliver_code(&email, &name, &code).await?;
        tracing::info!(email = %email, "Registration challenge issued");

        Ok(IssuedChallenge { code, expires_in_seconds: self.otp_ttl.num_seconds().max(0) as u64 })
    }

    /// Complete a registration: validate the code, create the account, mint
    /// a credential pair
    ///
    /// There is no compensating rollback: if signing fails after the account
    /// is created, the account stands and the pending entry ages out.
    pub async fn complete_registration(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(Account, TokenPair)> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_code_format(code)?;

        let key = Self::pending_key(&email);
        let data = self
            .storage
            .get(&key)
            .await
            .map_err(|e| Error::storage(format!("Failed to read pending registration: {e}")))?;

        let Some(data) = data else {
            return Err(Error::not_found("Registration request not found or expired"));
        };

        let mut pending: PendingRegistration = serde_json::from_slice(&data).map_err(|e| {
            Error::internal(format!("Failed to deserialize pending registration: {e}"))
        })?;

        match pending.challenge.verify(code, self.otp_ttl) {
            ChallengeOutcome::Passed => {},
            ChallengeOutcome::Expired => {
                // The profile stays until the entry TTL runs out; requesting
                // a new code overwrites it with a fresh challenge.
                return Err(Error::validation("OTP expired or not found"));
            },
            ChallengeOutcome::Failed => {
                let remaining = pending.challenge.remaining_ttl(self.pending_ttl);
                self.write_pending(&pending, remaining).await?;
                return Err(Error::validation("Invalid OTP"));
            },
            ChallengeOutcome::Exhausted => {
                self.delete_pending(&email).await?;
                return Err(Error::validation("Too many failed attempts, request a new code"));
            },
        }

        let account = Account::builder()
            .id(IdGenerator::next_id())
            .name(pending.name)
            .email(pending.email)
            .create()?;
        self.accounts.create(account.clone()).await?;

        let pair = self.mint_pair(account.id)?;
        self.delete_pending(&email).await?;

        tracing::info!(account_id = account.id, "Registration completed");
        Ok((account, pair))
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Start a login: challenge the email of an existing account
    pub async fn begin_login(&self, email: &str) -> Result<IssuedChallenge> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found("Account not found"))?;

        let code = self.otp.issue(&email).await?;
        self.deliver_code(&email, &account.name, &code).await?;
        tracing::info!(account_id = account.id, "Login challenge issued");

        Ok(IssuedChallenge { code, expires_in_seconds: self.otp_ttl.num_seconds().max(0) as u64 })
    }

    /// Complete a login: validate the code and mint a credential pair
    pub async fn complete_login(&self, email: &str, code: &str) -> Result<(Account, TokenPair)> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_code_format(code)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found("Account not found"))?;

        self.otp.validate(&email, code).await?;

        let pair = self.mint_pair(account.id)?;
        tracing::info!(account_id = account.id, "Login completed");
        Ok((account, pair))
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Exchange a refresh token for a new pair
    ///
    /// The presented session ID is consumed: it goes on the denylist for its
    /// remaining lifetime and the new pair carries a fresh one. Replaying
    /// the old refresh token afterwards fails verification.
    pub async fn refresh(&self, token: &str) -> Result<TokenPair> {
        let claims = self.verify_active(token).await?;

        self.revoked
            .revoke(&claims.jti, std::time::Duration::from_secs(claims.remaining_seconds()))
            .await?;

        let jti = TokenIssuer::new_session_id();
        let pair = self.tokens.issue(&claims.id, &jti)?;
        tracing::debug!(subject = %claims.id, "Credential pair refreshed");
        Ok(pair)
    }

    /// Revoke the session a token belongs to
    pub async fn logout(&self, token: &str) -> Result<()> {
        let claims = self.verify_active(token).await?;

        self.revoked
            .revoke(&claims.jti, std::time::Duration::from_secs(claims.remaining_seconds()))
            .await?;

        tracing::info!(subject = %claims.id, "Session logged out");
        Ok(())
    }

    /// Verify a token and reject revoked sessions
    ///
    /// Used by the HTTP auth middleware and by every token-consuming
    /// operation here.
    pub async fn verify_active(&self, token: &str) -> Result<Claims> {
        let claims = self.tokens.verify(token)?;

        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(Error::auth("Token has been revoked"));
        }

        Ok(claims)
    }

    /// Load the account behind a verified subject claim
    pub async fn get_account(&self, subject_id: &str) -> Result<Account> {
        let id: i64 = subject_id.parse().map_err(|_| Error::auth("Invalid token"))?;

        self.accounts.get(id).await?.ok_or_else(|| Error::not_found("Account not found"))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn mint_pair(&self, account_id: i64) -> Result<TokenPair> {
        let jti = TokenIssuer::new_session_id();
        self.tokens.issue(&account_id.to_string(), &jti)
    }

    async fn write_pending(&self, pending: &PendingRegistration, ttl: Duration) -> Result<()> {
        let data = serde_json::to_vec(pending)
            .map_err(|e| Error::internal(format!("Failed to serialize pending registration: {e}")))?;

        self.storage
            .set_with_ttl(Self::pending_key(&pending.email), data, ttl.to_std().unwrap_or_default())
            .await
            .map_err(|e| Error::storage(format!("Failed to store pending registration: {e}")))
    }

    async fn delete_pending(&self, email: &str) -> Result<()> {
        self.storage
            .delete(&Self::pending_key(email))
            .await
            .map_err(|e| Error::storage(format!("Failed to delete pending registration: {e}")))
    }

    async fn deliver_code(&self, email: &str, name: &str, code: &str) -> Result<()> {
        match &self.email_service {
            Some(service) => {
                let template =
                    OtpEmailTemplate { name: name.to_string(), code: code.to_string() };
                service
                    .send_email(
                        email,
                        &template.subject(),
                        &template.body_html(),
                        &template.body_text(),
                    )
                    .await
            },
            None => {
                // No delivery channel configured; surface the code in the
                // server log so local setups stay usable.
                tracing::info!(email = %email, code = %code, "Email disabled, code logged only");
                Ok(())
            },
        }
    }
}
