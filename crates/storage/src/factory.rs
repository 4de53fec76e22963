use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use bytes::Bytes;

use crate::{
    MemoryBackend, RedisBackend,
    backend::{StorageBackend, StorageError, StorageResult},
};

/// Storage backend type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory storage (for development and testing)
    Memory,
    /// Redis storage (production backend)
    Redis,
}

/// Redis-specific configuration
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct RedisConfig {
    /// Redis endpoint URL (e.g., "redis://localhost:6379")
    pub url: String,
}

/// Storage backend configuration
#[derive(Debug, Clone, Builder)]
pub struct StorageConfig {
    /// Backend type
    pub backend_type: StorageBackendType,
    /// Redis configuration (only used for the Redis backend)
    pub redis: Option<RedisConfig>,
}

impl StorageConfig {
    /// Create a new in-memory storage configuration
    pub fn memory() -> Self {
        Self { backend_type: StorageBackendType::Memory, redis: None }
    }

    /// Create a new Redis storage configuration
    pub fn redis(config: RedisConfig) -> Self {
        Self { backend_type: StorageBackendType::Redis, redis: Some(config) }
    }
}

/// Backend enum wrapper that implements StorageBackend
#[derive(Clone)]
pub enum Backend {
    /// In-memory backend
    Memory(MemoryBackend),
    /// Redis backend for production
    Redis(RedisBackend),
}

impl Backend {
    /// Creates a new in-memory backend.
    #[must_use]
    pub fn memory() -> Self {
        Backend::Memory(MemoryBackend::new())
    }

    /// Returns a reference to the underlying `MemoryBackend` if this is a
    /// memory backend.
    ///
    /// Useful in tests that need raw access to the same data store the
    /// handlers see.
    #[must_use]
    pub fn as_memory(&self) -> Option<&MemoryBackend> {
        match self {
            Backend::Memory(storage) => Some(storage),
            Backend::Redis(_) => None,
        }
    }
}

/// Delegates a method call to the inner storage backend of each `Backend`
/// variant, eliminating the repetitive match across all trait methods.
macro_rules! delegate_storage {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            Backend::Memory(__backend) => __backend.$method($($arg),*).await,
            Backend::Redis(__backend) => __backend.$method($($arg),*).await,
        }
    };
}

#[async_trait]
impl StorageBackend for Backend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        delegate_storage!(self, get(key))
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        delegate_storage!(self, set(key, value))
    }

    async fn set_with_ttl(&self, key: Vec<u8>, value: Vec<u8>, ttl: Duration) -> StorageResult<()> {
        delegate_storage!(self, set_with_ttl(key, value, ttl))
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        delegate_storage!(self, delete(key))
    }

    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        delegate_storage!(self, compare_and_set(key, expected, new_value))
    }

    async fn health_check(&self) -> StorageResult<()> {
        delegate_storage!(self, health_check())
    }
}

/// Create a storage backend based on configuration
///
/// # Errors
///
/// Returns an error if the backend cannot be created
pub async fn create_storage_backend(config: &StorageConfig) -> StorageResult<Backend> {
    match config.backend_type {
        StorageBackendType::Memory => Ok(Backend::memory()),
        StorageBackendType::Redis => {
            let redis_config = config.redis.as_ref().ok_or_else(|| {
                StorageError::backend("Redis configuration required for Redis backend")
            })?;
            let backend = RedisBackend::connect(&redis_config.url).await?;
            Ok(Backend::Redis(backend))
        },
    }
}
