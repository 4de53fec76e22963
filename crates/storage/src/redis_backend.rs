//! Redis storage backend.
//!
//! Production backend. TTL semantics map directly onto Redis key expiry
//! (`SET ... EX`), and the conditional write runs as a Lua script so the
//! read-compare-write is atomic on the server.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::backend::{StorageBackend, StorageError, StorageResult};

/// Timeout for establishing the initial connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Atomic compare-and-set.
///
/// ARGV[1] is "1" when a current value is expected (ARGV[2]), "0" when the
/// key must be absent. ARGV[3] is the new value. Returns 1 when applied.
const CAS_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
  if current == ARGV[2] then
    redis.call('SET', KEYS[1], ARGV[3])
    return 1
  end
else
  if current == false then
    redis.call('SET', KEYS[1], ARGV[3])
    return 1
  end
end
return 0
"#;

/// Redis-backed storage
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect to Redis at the given URL
    ///
    /// The connection manager transparently reconnects on broken
    /// connections; individual operations still fail fast.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(CONNECT_TIMEOUT);

        let client = Client::open(url)
            .map_err(|e| StorageError::backend(format!("Invalid Redis URL: {e}")))?;

        let conn = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| StorageError::backend(format!("Failed to connect to Redis: {e}")))?;

        tracing::info!("Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl StorageBackend for RedisBackend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| StorageError::backend(format!("Redis GET failed: {e}")))?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| StorageError::backend(format!("Redis SET failed: {e}")))?;
        Ok(())
    }

    async fn set_with_ttl(&self, key: Vec<u8>, value: Vec<u8>, ttl: Duration) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        // Redis expiry has whole-second resolution; round up so a short TTL
        // never becomes "no expiry at all".
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| StorageError::backend(format!("Redis SET EX failed: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| StorageError::backend(format!("Redis DEL failed: {e}")))?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        let mut conn = self.conn.clone();

        let has_expected = if expected.is_some() { "1" } else { "0" };
        let applied: i32 = Script::new(CAS_SCRIPT)
            .key(key)
            .arg(has_expected)
            .arg(expected.unwrap_or_default())
            .arg(new_value)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StorageError::backend(format!("Redis CAS script failed: {e}")))?;

        if applied == 1 {
            Ok(())
        } else {
            Err(StorageError::conflict("current value does not match expected"))
        }
    }

    async fn health_check(&self) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StorageError::backend(format!("Redis PING failed: {e}")))?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(StorageError::backend(format!("Unexpected PING reply: {pong}")))
        }
    }
}
