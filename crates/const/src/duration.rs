//! Code and token duration constants.

/// One-time code TTL in seconds (5 minutes).
///
/// A code not validated within this window becomes unreadable and the
/// challenge must be re-requested.
pub const OTP_TTL_SECONDS: u64 = 5 * 60;

/// Pending registration entry TTL in seconds (1 hour).
///
/// Submitted name/email wait in the store under this TTL until the
/// applicant proves control of the address. The embedded challenge keeps
/// its own, shorter code window.
pub const PENDING_REGISTRATION_TTL_SECONDS: u64 = 60 * 60;

/// Access token TTL in seconds (15 minutes).
///
/// Access tokens are verified statelessly and never stored server-side,
/// so their lifetime is kept short.
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;

/// Refresh token TTL in seconds (7 days).
///
/// Must always exceed the access token TTL; the issuer enforces the
/// ordering at construction time.
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
