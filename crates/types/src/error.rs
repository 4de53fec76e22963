use std::backtrace::Backtrace;

use snafu::Snafu;

/// Result type alias for identity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Identity API
///
/// All variants include backtraces for debugging. Use the constructor methods
/// (e.g., `Error::validation("message")`) to create errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Configuration errors
    #[snafu(display("Configuration error: {message}"))]
    Config { message: String, backtrace: Backtrace },

    /// Storage errors
    #[snafu(display("Storage error: {message}"))]
    Storage { message: String, backtrace: Backtrace },

    /// Validation errors (malformed input, bad or expired one-time codes)
    #[snafu(display("{message}"))]
    Validation { message: String, backtrace: Backtrace },

    /// Authentication errors (bad, expired, or revoked credentials)
    #[snafu(display("{message}"))]
    Auth { message: String, backtrace: Backtrace },

    /// Resource not found
    #[snafu(display("{message}"))]
    NotFound { message: String, backtrace: Backtrace },

    /// Resource already exists
    #[snafu(display("{message}"))]
    AlreadyExists { message: String, backtrace: Backtrace },

    /// Internal system errors
    #[snafu(display("Internal error: {message}"))]
    Internal { message: String, backtrace: Backtrace },
}

impl Error {
    // =========================================================================
    // Constructors - capture backtraces at the point of creation
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ConfigSnafu { message: message.into() }.build()
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        StorageSnafu { message: message.into() }.build()
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ValidationSnafu { message: message.into() }.build()
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        AuthSnafu { message: message.into() }.build()
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        NotFoundSnafu { message: message.into() }.build()
    }

    /// Create an already exists error
    pub fn already_exists(message: impl Into<String>) -> Self {
        AlreadyExistsSnafu { message: message.into() }.build()
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        InternalSnafu { message: message.into() }.build()
    }

    // =========================================================================
    // Metadata accessors
    // =========================================================================

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 500,
            Error::Storage { .. } => 500,
            Error::Validation { .. } => 400,
            Error::Auth { .. } => 401,
            Error::NotFound { .. } => 404,
            Error::AlreadyExists { .. } => 409,
            Error::Internal { .. } => 500,
        }
    }

    /// Get error code for client consumption
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "CONFIGURATION_ERROR",
            Error::Storage { .. } => "STORAGE_ERROR",
            Error::Validation { .. } => "VALIDATION_ERROR",
            Error::Auth { .. } => "AUTHENTICATION_ERROR",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::AlreadyExists { .. } => "ALREADY_EXISTS",
            Error::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether this error should be surfaced to the client verbatim.
    ///
    /// Server-side errors (config, storage, internal) are logged and replaced
    /// by a generic message at the HTTP boundary.
    pub fn is_client_facing(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(Error::validation("x").status_code(), 400);
        assert_eq!(Error::auth("x").status_code(), 401);
        assert_eq!(Error::not_found("x").status_code(), 404);
        assert_eq!(Error::already_exists("x").status_code(), 409);
        assert_eq!(Error::config("x").status_code(), 500);
        assert_eq!(Error::storage("x").status_code(), 500);
        assert_eq!(Error::internal("x").status_code(), 500);
    }

    #[test]
    fn client_facing_errors_keep_their_message() {
        let err = Error::validation("Invalid OTP");
        assert!(err.is_client_facing());
        assert_eq!(err.to_string(), "Invalid OTP");
    }

    #[test]
    fn server_errors_are_not_client_facing() {
        assert!(!Error::storage("connection refused").is_client_facing());
        assert!(!Error::internal("boom").is_client_facing());
        assert!(!Error::config("missing secret").is_client_facing());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(Error::validation("x").error_code(), "VALIDATION_ERROR");
        assert_eq!(Error::already_exists("x").error_code(), "ALREADY_EXISTS");
        assert_eq!(Error::auth("x").error_code(), "AUTHENTICATION_ERROR");
    }
}
