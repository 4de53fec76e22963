//! Core storage abstractions.
//!
//! The identity flow treats its backing store as a key-value store with
//! per-key expiry. Every mutable shared state in the service (challenges,
//! pending registrations, accounts, the revocation list) lives behind this
//! trait, so tests run against [`MemoryBackend`](crate::MemoryBackend) and
//! production runs against Redis without the core noticing.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use snafu::Snafu;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Canonical error type for storage operations
#[derive(Debug, Snafu)]
pub enum StorageError {
    /// The backend failed to execute an operation
    #[snafu(display("Storage backend error: {message}"))]
    Backend { message: String },

    /// A conditional write found unexpected current state
    #[snafu(display("Conditional write conflict: {message}"))]
    Conflict { message: String },
}

impl StorageError {
    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        BackendSnafu { message: message.into() }.build()
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        ConflictSnafu { message: message.into() }.build()
    }

    /// Whether this error is a conditional-write conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Core trait for key-value storage operations
///
/// Implementations must provide per-key TTL expiry; an expired key behaves
/// exactly like an absent one. The only cross-request ordering guarantee is
/// per-key last-write-wins.
#[async_trait]
pub trait StorageBackend: Clone + Send + Sync + 'static {
    /// Get a value by key. Expired keys read as `None`.
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>>;

    /// Set a key to a value with no expiry, overwriting any prior value.
    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()>;

    /// Set a key to a value that expires after `ttl`.
    ///
    /// Overwrites any prior value and any prior TTL.
    async fn set_with_ttl(&self, key: Vec<u8>, value: Vec<u8>, ttl: Duration) -> StorageResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Write `new_value` only if the current value equals `expected`.
    ///
    /// `expected = None` claims an absent key. Returns
    /// [`StorageError::Conflict`] when the current state does not match, which
    /// is how uniqueness is enforced at the storage layer.
    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()>;

    /// Verify the backend is reachable and serving requests.
    async fn health_check(&self) -> StorageResult<()>;
}
