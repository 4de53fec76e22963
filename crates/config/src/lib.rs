//! # Gramstay Identity Configuration
//!
//! CLI-first configuration for the Identity API. Uses `clap::Parser` for
//! argument parsing with environment variable fallbacks, and `bon::Builder`
//! for ergonomic test construction without CLI/env interference.
//!
//! ```no_run
//! use gramstay_identity_config::{Cli, Config};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let config = cli.config;
//! config.validate().expect("invalid configuration");
//! ```
//!
//! ```no_run
//! use gramstay_identity_config::{Config, StorageBackend};
//!
//! let config = Config::builder()
//!     .storage(StorageBackend::Memory)
//!     .token_secret("0123456789abcdef0123456789abcdef")
//!     .build();
//! ```

#![deny(unsafe_code)]

use std::net::SocketAddr;

use bon::Builder;
use clap::Parser;
use gramstay_identity_const::MIN_TOKEN_SECRET_LENGTH;
use gramstay_identity_types::error::{Error, Result};

/// Default HTTP listen address.
const DEFAULT_LISTEN: &str = "127.0.0.1:8086";

/// Default log level filter string.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default email from address.
const DEFAULT_EMAIL_FROM_ADDRESS: &str = "noreply@gramstay.com";

/// Default email from display name.
const DEFAULT_EMAIL_FROM_NAME: &str = "Gramstay";

/// Default SMTP port.
const DEFAULT_EMAIL_PORT: u16 = 587;

/// Maximum valid Snowflake worker ID (10 bits).
const MAX_WORKER_ID: u16 = 1023;

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory storage (data lost on restart).
    Memory,
    /// Redis-backed storage.
    #[default]
    Redis,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Automatically detect: JSON for non-TTY stdout, text otherwise.
    #[default]
    Auto,
    /// JSON structured logging (recommended for production).
    Json,
    /// Human-readable text format.
    Text,
}

/// Command-line interface for the Gramstay Identity service.
#[derive(Debug, Parser)]
#[command(name = "gramstay-identity")]
#[command(version)]
pub struct Cli {
    /// Server configuration (flattened so flags appear at top level).
    #[command(flatten)]
    pub config: Config,
}

/// Configuration for the Gramstay Identity service.
///
/// All fields are configurable via CLI flags or environment variables.
/// Precedence: CLI arg > env var > default value.
///
/// Sensitive fields (`token_secret`, `email_password`) use `hide_env_values`
/// to prevent leaking secrets in `--help` output.
#[derive(Debug, Clone, Builder, Parser)]
#[command(name = "gramstay-identity")]
#[command(version)]
#[builder(on(String, into))]
pub struct Config {
    // ── Server ───────────────────────────────────────────────────────
    /// HTTP bind address.
    #[arg(long = "listen", env = "GRAMSTAY__IDENTITY__LISTEN", default_value = DEFAULT_LISTEN)]
    #[builder(default = default_listen())]
    pub listen: SocketAddr,

    /// Tracing-subscriber filter string (e.g., info, debug, trace).
    #[arg(long = "log-level", env = "GRAMSTAY__IDENTITY__LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    #[builder(default = DEFAULT_LOG_LEVEL.to_string())]
    pub log_level: String,

    /// Log output format: auto, json, or text.
    #[arg(
        long = "log-format",
        env = "GRAMSTAY__IDENTITY__LOG_FORMAT",
        value_enum,
        default_value = "auto"
    )]
    #[builder(default)]
    pub log_format: LogFormat,

    // ── Tokens & Identity ────────────────────────────────────────────
    /// HS256 signing secret for access/refresh tokens.
    /// Required outside dev mode; must be at least 32 bytes.
    #[arg(long = "token-secret", env = "GRAMSTAY__IDENTITY__TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Snowflake worker ID for this instance (0-1023).
    #[arg(long = "worker-id", env = "GRAMSTAY__IDENTITY__WORKER_ID", default_value_t = 0)]
    #[builder(default = 0)]
    pub worker_id: u16,

    // ── Storage ──────────────────────────────────────────────────────
    /// Storage backend: memory or redis.
    #[arg(
        long = "storage",
        env = "GRAMSTAY__IDENTITY__STORAGE",
        value_enum,
        default_value = "redis"
    )]
    #[builder(default)]
    pub storage: StorageBackend,

    /// Redis endpoint URL. Required when storage=redis.
    #[arg(long = "redis-url", env = "GRAMSTAY__IDENTITY__REDIS_URL")]
    pub redis_url: Option<String>,

    // ── Email (SMTP) ─────────────────────────────────────────────────
    /// SMTP host. Empty string disables email.
    #[arg(long = "email-host", env = "GRAMSTAY__IDENTITY__EMAIL_HOST", default_value = "")]
    #[builder(default)]
    pub email_host: String,

    /// SMTP port.
    #[arg(long = "email-port", env = "GRAMSTAY__IDENTITY__EMAIL_PORT", default_value_t = DEFAULT_EMAIL_PORT)]
    #[builder(default = DEFAULT_EMAIL_PORT)]
    pub email_port: u16,

    /// SMTP username.
    #[arg(long = "email-username", env = "GRAMSTAY__IDENTITY__EMAIL_USERNAME")]
    pub email_username: Option<String>,

    /// SMTP password.
    #[arg(
        long = "email-password",
        env = "GRAMSTAY__IDENTITY__EMAIL_PASSWORD",
        hide_env_values = true
    )]
    pub email_password: Option<String>,

    /// From email address for outgoing messages.
    #[arg(long = "email-from-address", env = "GRAMSTAY__IDENTITY__EMAIL_FROM_ADDRESS", default_value = DEFAULT_EMAIL_FROM_ADDRESS)]
    #[builder(default = DEFAULT_EMAIL_FROM_ADDRESS.to_string())]
    pub email_from_address: String,

    /// From display name for outgoing messages.
    #[arg(long = "email-from-name", env = "GRAMSTAY__IDENTITY__EMAIL_FROM_NAME", default_value = DEFAULT_EMAIL_FROM_NAME)]
    #[builder(default = DEFAULT_EMAIL_FROM_NAME.to_string())]
    pub email_from_name: String,

    /// Allow insecure (unencrypted) SMTP connections.
    /// Only for local development with tools like Mailpit.
    #[arg(long = "email-insecure", env = "GRAMSTAY__IDENTITY__EMAIL_INSECURE")]
    #[builder(default)]
    pub email_insecure: bool,

    // ── Mode Flags ───────────────────────────────────────────────────
    /// Force development mode: uses in-memory storage regardless of
    /// --storage, allows an ephemeral token secret, and echoes one-time
    /// codes in HTTP responses. No environment variable — this must be an
    /// explicit CLI choice.
    #[arg(long = "dev-mode")]
    #[builder(default)]
    pub dev_mode: bool,
}

fn default_listen() -> SocketAddr {
    #[allow(clippy::expect_used)]
    DEFAULT_LISTEN.parse().expect("valid default listen address")
}

impl Config {
    /// Validate cross-field business rules.
    ///
    /// Must be called after parsing and before using the config. Checks
    /// redis storage requirements, the token secret, and worker ID range,
    /// accounting for dev-mode overrides.
    pub fn validate(&self) -> Result<()> {
        // Validate redis storage requirements
        if self.effective_storage() == StorageBackend::Redis {
            let Some(url) = self.redis_url.as_ref() else {
                return Err(Error::config("--redis-url is required when storage=redis"));
            };
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(Error::config(format!(
                    "--redis-url must start with redis:// or rediss://, got: {url}"
                )));
            }
        }

        // Validate the signing secret
        match self.token_secret.as_ref() {
            Some(secret) if secret.len() < MIN_TOKEN_SECRET_LENGTH => {
                return Err(Error::config(format!(
                    "--token-secret must be at least {MIN_TOKEN_SECRET_LENGTH} bytes"
                )));
            },
            None if !self.dev_mode => {
                return Err(Error::config(
                    "--token-secret is required outside dev mode (see --dev-mode)",
                ));
            },
            _ => {},
        }

        if self.worker_id > MAX_WORKER_ID {
            return Err(Error::config(format!(
                "--worker-id must be between 0 and {MAX_WORKER_ID}, got {}",
                self.worker_id
            )));
        }

        Ok(())
    }

    /// Returns whether email sending is enabled.
    ///
    /// Email is disabled when `email_host` is empty (the default).
    pub fn is_email_enabled(&self) -> bool {
        !self.email_host.is_empty()
    }

    /// Returns the effective storage backend, accounting for dev-mode
    /// override.
    ///
    /// When `dev_mode` is true, always returns `Memory` regardless of the
    /// `storage` field value.
    pub fn effective_storage(&self) -> StorageBackend {
        if self.dev_mode { StorageBackend::Memory } else { self.storage }
    }

    /// Returns whether dev-mode is enabled.
    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// A secret that satisfies the length floor.
    const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

    // ── Default Values ───────────────────────────────────────────────

    #[test]
    fn defaults_match_expected_values() {
        let config = Config::builder().build();

        assert_eq!(config.listen, "127.0.0.1:8086".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Auto);
        assert!(config.token_secret.is_none());
        assert_eq!(config.worker_id, 0);
        assert_eq!(config.storage, StorageBackend::Redis);
        assert!(config.redis_url.is_none());
        assert_eq!(config.email_host, "");
        assert_eq!(config.email_port, 587);
        assert!(config.email_username.is_none());
        assert!(config.email_password.is_none());
        assert_eq!(config.email_from_address, "noreply@gramstay.com");
        assert_eq!(config.email_from_name, "Gramstay");
        assert!(!config.email_insecure);
        assert!(!config.dev_mode);
    }

    // ── Validation: Redis Storage ────────────────────────────────────

    #[test]
    fn validate_rejects_redis_without_url() {
        let config =
            Config::builder().storage(StorageBackend::Redis).token_secret(TEST_SECRET).build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--redis-url is required"));
    }

    #[test]
    fn validate_rejects_invalid_redis_url_scheme() {
        let config = Config::builder()
            .storage(StorageBackend::Redis)
            .redis_url("http://localhost:6379")
            .token_secret(TEST_SECRET)
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("redis://"));
    }

    #[test]
    fn validate_passes_complete_redis_config() {
        let config = Config::builder()
            .storage(StorageBackend::Redis)
            .redis_url("redis://localhost:6379")
            .token_secret(TEST_SECRET)
            .build();
        assert!(config.validate().is_ok());
    }

    // ── Validation: Token Secret ─────────────────────────────────────

    #[test]
    fn validate_rejects_missing_secret_outside_dev_mode() {
        let config = Config::builder().storage(StorageBackend::Memory).build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--token-secret is required"));
    }

    #[test]
    fn validate_rejects_short_secret() {
        let config =
            Config::builder().storage(StorageBackend::Memory).token_secret("short").build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn validate_rejects_short_secret_even_in_dev_mode() {
        let config = Config::builder().dev_mode(true).token_secret("short").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn dev_mode_allows_missing_secret() {
        let config = Config::builder().dev_mode(true).build();
        assert!(config.validate().is_ok());
    }

    // ── Validation: Worker ID ────────────────────────────────────────

    #[test]
    fn validate_rejects_out_of_range_worker_id() {
        let config = Config::builder()
            .storage(StorageBackend::Memory)
            .token_secret(TEST_SECRET)
            .worker_id(1024)
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--worker-id"));
    }

    // ── Helper Methods ───────────────────────────────────────────────

    #[test]
    fn is_email_enabled_returns_false_when_host_empty() {
        let config = Config::builder().dev_mode(true).build();
        assert!(!config.is_email_enabled());
    }

    #[test]
    fn is_email_enabled_returns_true_when_host_set() {
        let config = Config::builder().dev_mode(true).email_host("smtp.example.com").build();
        assert!(config.is_email_enabled());
    }

    #[test]
    fn effective_storage_returns_memory_in_dev_mode() {
        let config = Config::builder().storage(StorageBackend::Redis).dev_mode(true).build();
        assert_eq!(config.effective_storage(), StorageBackend::Memory);
    }

    #[test]
    fn effective_storage_returns_field_when_not_dev_mode() {
        let config = Config::builder().storage(StorageBackend::Redis).build();
        assert_eq!(config.effective_storage(), StorageBackend::Redis);

        let config = Config::builder().storage(StorageBackend::Memory).build();
        assert_eq!(config.effective_storage(), StorageBackend::Memory);
    }

    #[test]
    fn dev_mode_skips_redis_validation() {
        let config = Config::builder().dev_mode(true).build();
        // dev_mode forces Memory, so redis fields aren't required
        assert!(config.validate().is_ok());
    }

    // ── CLI Parsing ──────────────────────────────────────────────────

    #[test]
    fn cli_parse_dev_mode() {
        let cli = Cli::try_parse_from(["test", "--dev-mode"]).unwrap();
        assert!(cli.config.dev_mode);
    }

    #[test]
    fn cli_parse_storage_memory() {
        let cli = Cli::try_parse_from(["test", "--storage", "memory"]).unwrap();
        assert_eq!(cli.config.storage, StorageBackend::Memory);
    }

    #[test]
    fn cli_parse_listen_address() {
        let cli = Cli::try_parse_from(["test", "--listen", "0.0.0.0:8080"]).unwrap();
        assert_eq!(cli.config.listen, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn cli_parse_log_format_json() {
        let cli = Cli::try_parse_from(["test", "--log-format", "json"]).unwrap();
        assert_eq!(cli.config.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_parse_token_secret_and_worker_id() {
        let cli = Cli::try_parse_from([
            "test",
            "--token-secret",
            TEST_SECRET,
            "--worker-id",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.config.token_secret.as_deref(), Some(TEST_SECRET));
        assert_eq!(cli.config.worker_id, 7);
    }

    #[test]
    fn cli_parse_redis_url() {
        let cli = Cli::try_parse_from(["test", "--redis-url", "redis://cache:6379"]).unwrap();
        assert_eq!(cli.config.redis_url.as_deref(), Some("redis://cache:6379"));
    }

    #[test]
    fn cli_rejects_invalid_storage_value() {
        let result = Cli::try_parse_from(["test", "--storage", "postgres"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        let result = Cli::try_parse_from(["test", "--config", "foo.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_email_fields() {
        let cli = Cli::try_parse_from([
            "test",
            "--storage",
            "memory",
            "--email-host",
            "smtp.example.com",
            "--email-port",
            "465",
            "--email-username",
            "user",
            "--email-password",
            "secret",
            "--email-from-address",
            "noreply@example.com",
            "--email-from-name",
            "MyApp",
            "--email-insecure",
        ])
        .unwrap();

        assert_eq!(cli.config.email_host, "smtp.example.com");
        assert_eq!(cli.config.email_port, 465);
        assert_eq!(cli.config.email_username.as_deref(), Some("user"));
        assert_eq!(cli.config.email_password.as_deref(), Some("secret"));
        assert_eq!(cli.config.email_from_address, "noreply@example.com");
        assert_eq!(cli.config.email_from_name, "MyApp");
        assert!(cli.config.email_insecure);
    }

    // ── Enum Display ─────────────────────────────────────────────────

    #[test]
    fn storage_backend_display() {
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
        assert_eq!(StorageBackend::Redis.to_string(), "redis");
    }

    #[test]
    fn log_format_display() {
        assert_eq!(LogFormat::Auto.to_string(), "auto");
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::Text.to_string(), "text");
    }
}
