use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gramstay_identity_api::AppState;
use gramstay_identity_config::{Cli, LogFormat, StorageBackend};
use gramstay_identity_core::{EmailService, IdGenerator, SmtpEmailService, TokenIssuer, logging};
use gramstay_identity_storage::{RedisConfig, StorageConfig, create_storage_backend};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    config.validate()?;

    // Initialize structured logging
    let log_config = logging::LogConfig {
        format: match config.log_format {
            LogFormat::Json => logging::LogFormat::Json,
            LogFormat::Text => logging::LogFormat::Full,
            LogFormat::Auto => {
                if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
                    logging::LogFormat::Full
                } else {
                    logging::LogFormat::Json
                }
            },
        },
        filter: Some(config.log_level.clone()),
        ..Default::default()
    };

    if let Err(e) = logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if config.is_dev_mode() {
        tracing::info!(
            "Development mode enabled via --dev-mode flag: using memory storage, codes are echoed in responses"
        );
    }

    let effective_storage = config.effective_storage();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = %effective_storage,
        "Starting Gramstay Identity"
    );

    // Storage backend
    let storage_config = match effective_storage {
        StorageBackend::Memory => StorageConfig::memory(),
        StorageBackend::Redis => {
            // config.validate() ensures the URL is present when storage == redis
            #[allow(clippy::expect_used)]
            StorageConfig::redis(
                RedisConfig::builder()
                    .url(config.redis_url.clone().expect("validated"))
                    .build(),
            )
        },
    };
    let storage = Arc::new(create_storage_backend(&storage_config).await?);
    tracing::info!(storage = %effective_storage, "Storage initialized");

    // Initialize the ID generator with the configured worker ID
    IdGenerator::init(config.worker_id)
        .map_err(|e| anyhow::anyhow!("Failed to initialize ID generator: {e}"))?;
    tracing::info!(worker_id = config.worker_id, "ID generator initialized");

    // Token signing secret: configured, or ephemeral in dev mode
    let secret = match config.token_secret.clone() {
        Some(secret) => secret,
        None => {
            // validate() only allows a missing secret in dev mode
            let ephemeral: [u8; 32] = rand::random();
            tracing::warn!(
                "No --token-secret configured; using an ephemeral secret. \
                 All tokens become invalid on restart."
            );
            hex::encode(ephemeral)
        },
    };

    let tokens = Arc::new(
        TokenIssuer::builder()
            .secret(secret)
            .create()
            .map_err(|e| anyhow::anyhow!("Failed to create token issuer: {e}"))?,
    );

    // Initialize email service (if configured)
    let email_service = if config.is_email_enabled() {
        match SmtpEmailService::new(
            &config.email_host,
            config.email_port,
            config.email_username.as_deref().unwrap_or_default(),
            config.email_password.as_deref().unwrap_or_default(),
            config.email_from_address.clone(),
            config.email_from_name.clone(),
            config.email_insecure,
        ) {
            Ok(smtp_service) => {
                tracing::info!(
                    host = %config.email_host,
                    port = config.email_port,
                    insecure = config.email_insecure,
                    "Email service initialized"
                );
                Some(Arc::new(EmailService::new(Box::new(smtp_service))))
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to initialize email service - emails will be disabled");
                None
            },
        }
    } else {
        tracing::info!("Email service not configured - verification codes are logged only");
        None
    };

    let state = AppState::builder()
        .storage(storage)
        .config(Arc::new(config))
        .tokens(tokens)
        .maybe_email_service(email_service)
        .build();

    gramstay_identity_api::serve(state).await?;

    tracing::info!("Shutting down gracefully");
    Ok(())
}
