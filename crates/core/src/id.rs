use std::sync::OnceLock;

use gramstay_identity_types::error::{Error, Result};
use idgenerator::IdGeneratorOptions;

/// Custom epoch for Snowflake IDs: 2024-01-01T00:00:00Z (in milliseconds)
const CUSTOM_EPOCH: i64 = 1704067200000;

/// Maximum valid worker ID (10 bits = 1024 values, 0-1023)
const MAX_WORKER_ID: u16 = 1023;

/// Stores the worker ID after initialization. Using OnceLock ensures
/// thread-safe one-time initialization without requiring unsafe code.
static WORKER_ID: OnceLock<u16> = OnceLock::new();

/// Snowflake ID generator with custom epoch and worker ID management
pub struct IdGenerator;

impl IdGenerator {
    /// Initialize the global ID generator with the specified worker ID
    ///
    /// This must be called once at application startup before generating any
    /// IDs.
    ///
    /// # Arguments
    ///
    /// * `worker_id` - Worker ID (0-1023) for this instance
    ///
    /// # Errors
    ///
    /// Returns an error if worker_id is out of range
    pub fn init(worker_id: u16) -> Result<()> {
        if worker_id > MAX_WORKER_ID {
            return Err(Error::config(format!(
                "Worker ID must be between 0 and {MAX_WORKER_ID}, got {worker_id}"
            )));
        }

        WORKER_ID.get_or_init(|| {
            let options = IdGeneratorOptions::new()
                .worker_id(worker_id.into())
                .worker_id_bit_len(10)
                .base_time(CUSTOM_EPOCH);

            // Initialization failure at startup is unrecoverable - panic is appropriate
            #[allow(clippy::expect_used)]
            idgenerator::IdInstance::init(options).expect("Failed to initialize ID generator");
            worker_id
        });

        Ok(())
    }

    /// Generate a new unique ID
    ///
    /// # Panics
    ///
    /// Panics if `init()` has not been called first
    pub fn next_id() -> i64 {
        idgenerator::IdInstance::next_id()
    }

    /// Get the worker ID for this generator
    ///
    /// Returns 0 if the generator has not been initialized.
    pub fn worker_id() -> u16 {
        WORKER_ID.get().copied().unwrap_or(0)
    }
}
