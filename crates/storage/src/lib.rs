#![deny(unsafe_code)]

pub mod backend;
pub mod factory;
pub mod memory;
pub mod redis_backend;

pub use backend::{StorageBackend, StorageError, StorageResult};
pub use factory::{
    Backend, RedisConfig, StorageBackendType, StorageConfig, create_storage_backend,
};
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
