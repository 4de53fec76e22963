use bon::bon;
use chrono::Duration;
use gramstay_identity_const::OTP_TTL_SECONDS;
use gramstay_identity_storage::StorageBackend;
use gramstay_identity_types::{
    entities::{ChallengeOutcome, OtpChallenge},
    error::{Error, Result},
};

/// Single-use numeric codes scoped to a recipient key
///
/// Codes live in the backing store under `otp:{recipient}` with a TTL, so
/// expiry is store-enforced even if this process never touches the entry
/// again. At most one code is live per recipient; issuing again overwrites.
pub struct OtpStore<S: StorageBackend> {
    storage: S,
    ttl: Duration,
}

#[bon]
impl<S: StorageBackend> OtpStore<S> {
    /// Create an OTP store over the given backend
    #[builder]
    pub fn new(
        storage: S,
        #[builder(default = Duration::seconds(OTP_TTL_SECONDS as i64))] ttl: Duration,
    ) -> Self {
        Self { storage, ttl }
    }

    /// Storage key for a recipient's live challenge
    fn challenge_key(recipient: &str) -> Vec<u8> {
        format!("otp:{recipient}").into_bytes()
    }

    /// Issue a fresh code for a recipient
    ///
    /// Overwrites any live code for the key; the previous code stops
    /// validating immediately. Returns the code for delivery.
    pub async fn issue(&self, recipient: &str) -> Result<String> {
        let code = OtpChallenge::generate_code();
        let challenge = OtpChallenge::new(code.clone());

        self.write_challenge(recipient, &challenge, self.ttl).await?;
        tracing::debug!(recipient, "Issued one-time code");

        Ok(code)
    }

    /// Validate a submitted code
    ///
    /// On success the entry is deleted (single use). A wrong guess burns one
    /// attempt and is written back with the remaining TTL; once the guess
    /// budget is spent the entry is destroyed and a new code must be
    /// requested.
    pub async fn validate(&self, recipient: &str, submitted: &str) -> Result<()> {
        let key = Self::challenge_key(recipient);

        let data = self
            .storage
            .get(&key)
            .await
            .map_err(|e| Error::storage(format!("Failed to read challenge: {e}")))?;

        let Some(data) = data else {
            return Err(Error::validation("OTP expired or not found"));
        };

        let mut challenge: OtpChallenge = serde_json::from_slice(&data)
            .map_err(|e| Error::internal(format!("Failed to deserialize challenge: {e}")))?;

        match challenge.verify(submitted, self.ttl) {
            ChallengeOutcome::Passed => {
                self.delete_challenge(recipient).await?;
                tracing::debug!(recipient, "One-time code validated");
                Ok(())
            },
            ChallengeOutcome::Expired => {
                self.delete_challenge(recipient).await?;
                Err(Error::validation("OTP expired or not found"))
            },
            ChallengeOutcome::Failed => {
                // Keep the original deadline: a guess must never extend a
                // code's life.
                let remaining = challenge.remaining_ttl(self.ttl);
                self.write_challenge(recipient, &challenge, remaining).await?;
                tracing::debug!(recipient, attempts = challenge.attempts, "Wrong one-time code");
                Err(Error::validation("Invalid OTP"))
            },
            ChallengeOutcome::Exhausted => {
                self.delete_challenge(recipient).await?;
                tracing::warn!(recipient, "One-time code guess budget exhausted");
                Err(Error::validation("Too many failed attempts, request a new code"))
            },
        }
    }

    async fn write_challenge(
        &self,
        recipient: &str,
        challenge: &OtpChallenge,
        ttl: Duration,
    ) -> Result<()> {
        let data = serde_json::to_vec(challenge)
            .map_err(|e| Error::internal(format!("Failed to serialize challenge: {e}")))?;

        self.storage
            .set_with_ttl(Self::challenge_key(recipient), data, ttl.to_std().unwrap_or_default())
            .await
            .map_err(|e| Error::storage(format!("Failed to store challenge: {e}")))
    }

    async fn delete_challenge(&self, recipient: &str) -> Result<()> {
        self.storage
            .delete(&Self::challenge_key(recipient))
            .await
            .map_err(|e| Error::storage(format!("Failed to delete challenge: {e}")))
    }
}
