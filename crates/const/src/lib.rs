//! # Gramstay Identity Constants
//!
//! Zero-dependency crate containing constants used across the identity
//! service codebase.
//!
//! This crate centralizes:
//! - Duration constants (code and token TTLs)
//! - Business limit constants (guess budgets, code length, secret length)

pub mod duration;
pub mod limits;

// Re-export commonly used constants at crate root
pub use duration::{
    ACCESS_TOKEN_TTL_SECONDS, OTP_TTL_SECONDS, PENDING_REGISTRATION_TTL_SECONDS,
    REFRESH_TOKEN_TTL_SECONDS,
};
pub use limits::{MAX_OTP_ATTEMPTS, MIN_TOKEN_SECRET_LENGTH, OTP_CODE_LENGTH};
