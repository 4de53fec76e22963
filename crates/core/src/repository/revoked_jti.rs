use std::time::Duration;

use chrono::Utc;
use gramstay_identity_storage::StorageBackend;
use gramstay_identity_types::error::{Error, Result};

/// Denylist of consumed session IDs
///
/// Verification is otherwise stateless, so rotation and logout work by
/// recording the `jti` of a retired pair here. Entries carry a TTL equal to
/// the remaining refresh-token lifetime: once the token could no longer
/// verify anyway, the entry has nothing left to deny and expires.
pub struct RevokedJtiRepository<S: StorageBackend> {
    storage: S,
}

impl<S: StorageBackend> RevokedJtiRepository<S> {
    /// Create a new repository instance
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Generate storage key for a revoked session ID
    fn revoked_key(jti: &str) -> Vec<u8> {
        format!("jti:revoked:{jti}").into_bytes()
    }

    /// Record a session ID as revoked for the given remaining lifetime
    pub async fn revoke(&self, jti: &str, remaining: Duration) -> Result<()> {
        // A zero TTL would make the entry vanish before it denies anything.
        let ttl = remaining.max(Duration::from_secs(1));
        let timestamp = Utc::now().to_rfc3339();

        self.storage
            .set_with_ttl(Self::revoked_key(jti), timestamp.into_bytes(), ttl)
            .await
            .map_err(|e| Error::storage(format!("Failed to record revoked session: {e}")))?;

        tracing::debug!(jti, "Session revoked");
        Ok(())
    }

    /// Whether a session ID has been revoked
    pub async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let entry = self
            .storage
            .get(&Self::revoked_key(jti))
            .await
            .map_err(|e| Error::storage(format!("Failed to check revoked session: {e}")))?;

        Ok(entry.is_some())
    }
}
