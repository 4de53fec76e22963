use gramstay_identity_storage::StorageBackend;
use gramstay_identity_types::{
    entities::Account,
    error::{Error, Result},
};

/// Repository for account entities
///
/// Key schema:
/// - `account:{id}` → serialized entity
/// - `account:email:{email}` → account ID (little-endian, for email lookup)
///
/// The email index is claimed with a conditional write, so uniqueness holds
/// at the storage layer even when two registrations race past the
/// application-level existence check.
pub struct AccountRepository<S: StorageBackend> {
    storage: S,
}

impl<S: StorageBackend> AccountRepository<S> {
    /// Create a new repository instance
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Generate primary key for an account by ID
    fn account_key(id: i64) -> Vec<u8> {
        format!("account:{id}").into_bytes()
    }

    /// Generate key for the email index
    fn email_index_key(email: &str) -> Vec<u8> {
        format!("account:email:{email}").into_bytes()
    }

    /// Store a new account
    ///
    /// Claims the email index first; a conflict there means another account
    /// already owns the address.
    pub async fn create(&self, account: Account) -> Result<()> {
        let index_key = Self::email_index_key(&account.email);
        let id_bytes = account.id.to_le_bytes().to_vec();

        self.storage.compare_and_set(&index_key, None, id_bytes).await.map_err(|e| {
            if e.is_conflict() {
                Error::already_exists("An account with this email already exists")
            } else {
                Error::storage(format!("Failed to claim email index: {e}"))
            }
        })?;

        let data = serde_json::to_vec(&account)
            .map_err(|e| Error::internal(format!("Failed to serialize account: {e}")))?;

        self.storage
            .set(Self::account_key(account.id), data)
            .await
            .map_err(|e| Error::storage(format!("Failed to store account: {e}")))?;

        tracing::info!(account_id = account.id, "Account created");
        Ok(())
    }

    /// Get an account by its primary ID
    pub async fn get(&self, id: i64) -> Result<Option<Account>> {
        let data = self
            .storage
            .get(&Self::account_key(id))
            .await
            .map_err(|e| Error::storage(format!("Failed to get account: {e}")))?;

        match data {
            Some(bytes) => {
                let account: Account = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::internal(format!("Failed to deserialize account: {e}")))?;
                Ok(Some(account))
            },
            None => Ok(None),
        }
    }

    /// Get an account by its normalized email address
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let data = self
            .storage
            .get(&Self::email_index_key(email))
            .await
            .map_err(|e| Error::storage(format!("Failed to get account by email: {e}")))?;

        match data {
            Some(bytes) => {
                let id = super::parse_i64_id(&bytes)?;
                self.get(id).await
            },
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use gramstay_identity_storage::MemoryBackend;

    use super::*;

    fn account(id: i64, email: &str) -> Account {
        Account::builder().id(id).name("Asha").email(email).create().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = AccountRepository::new(MemoryBackend::new());
        repo.create(account(1, "asha@example.com")).await.unwrap();

        let found = repo.get(1).await.unwrap().unwrap();
        assert_eq!(found.email, "asha@example.com");

        assert!(repo.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_email() {
        let repo = AccountRepository::new(MemoryBackend::new());
        repo.create(account(1, "asha@example.com")).await.unwrap();

        let found = repo.get_by_email("asha@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, 1);

        assert!(repo.get_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_at_storage_layer() {
        let repo = AccountRepository::new(MemoryBackend::new());
        repo.create(account(1, "asha@example.com")).await.unwrap();

        let err = repo.create(account(2, "asha@example.com")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));

        // The original record is untouched
        let found = repo.get_by_email("asha@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, 1);
    }
}
