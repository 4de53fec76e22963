//! # Gramstay Identity API
//!
//! REST API handlers and routes for the Gramstay identity service.
//!
//! ## Request Builders
//!
//! API request types use [`bon::Builder`] for ergonomic construction,
//! particularly useful in tests:
//!
//! ```no_run
//! use gramstay_identity_types::dto::{RegisterRequest, LoginRequest};
//!
//! let register = RegisterRequest::builder()
//!     .name("Asha")
//!     .email("asha@example.com")
//!     .build();
//!
//! let login = LoginRequest::builder()
//!     .email("asha@example.com")
//!     .build();
//! ```
//!
//! ## AppState Builder
//!
//! The [`AppState`] struct uses a builder for server initialization:
//!
//! ```no_run
//! use std::sync::Arc;
//! use gramstay_identity_api::AppState;
//!
//! # fn example(
//! #     storage: Arc<gramstay_identity_storage::Backend>,
//! #     config: Arc<gramstay_identity_config::Config>,
//! #     tokens: Arc<gramstay_identity_core::TokenIssuer>,
//! # ) {
//! let state = AppState::builder()
//!     .storage(storage)
//!     .config(config)
//!     .tokens(tokens)
//!     .maybe_email_service(None) // Optional email service
//!     .build();
//! # }
//! ```

#![deny(unsafe_code)]

use tracing::info;

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use handlers::AppState;
pub use middleware::{AuthContext, extract_bearer_token, require_access_token};
pub use response::{ApiError, ApiResponse, ApiResult};
pub use routes::create_router_with_state;

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM signal, initiating shutdown");
        }
    }
}

/// Start the Identity API HTTP server
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let listen = state.config.listen;
    let router = routes::create_router_with_state(state);

    // Bind listener (address is already validated in config)
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(listen = %listen, "Identity API listening");

    // Serve with graceful shutdown
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    Ok(())
}
