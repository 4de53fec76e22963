pub mod auth;
pub mod health;
pub mod tokens;

pub use auth::{AppState, login, login_verify, logout, me, register, register_verify};
pub use health::{healthz_handler, livez_handler, readyz_handler};
pub use tokens::refresh;
