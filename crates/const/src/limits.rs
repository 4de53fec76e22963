//! Business limit constants.

/// Failed guesses allowed before a challenge is destroyed.
///
/// The counter lives inside the challenge entry itself, so the budget
/// expires together with the code.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Length of a one-time code in digits.
pub const OTP_CODE_LENGTH: usize = 6;

/// Minimum length in bytes for the HS256 signing secret.
///
/// Shorter secrets are rejected at configuration validation time.
pub const MIN_TOKEN_SECRET_LENGTH: usize = 32;
