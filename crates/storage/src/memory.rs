//! In-memory storage backend.
//!
//! Thread-safe key-value storage with per-key TTL, used in dev mode and
//! tests. Expiry is enforced lazily: an expired entry is removed the next
//! time it is read or written through.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::backend::{StorageBackend, StorageError, StorageResult};

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory storage (data lost on restart)
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<Vec<u8>, StoredEntry>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {},
            }
        }

        // Entry was present but expired: upgrade to a write lock and evict.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(StoredEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key, StoredEntry { value: Bytes::from(value), expires_at: None });
        Ok(())
    }

    async fn set_with_ttl(&self, key: Vec<u8>, value: Vec<u8>, ttl: Duration) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            StoredEntry { value: Bytes::from(value), expires_at: Some(Instant::now() + ttl) },
        );
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        let mut entries = self.entries.write().await;

        let current = match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            },
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };

        let matches = match (expected, current.as_deref()) {
            (None, None) => true,
            (Some(expected), Some(current)) => expected == current,
            _ => false,
        };

        if !matches {
            return Err(StorageError::conflict("current value does not match expected"));
        }

        entries
            .insert(key.to_vec(), StoredEntry { value: Bytes::from(new_value), expires_at: None });
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
