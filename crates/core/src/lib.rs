#![deny(unsafe_code)]

//! # Gramstay Identity Core
//!
//! Core business logic for the Gramstay identity service: the OTP store,
//! the token issuer, the account and revocation repositories, and the
//! registration/login/refresh flow that binds them together.
//!
//! ## Imports
//!
//! Import types from their source crates:
//! - Entity types: `gramstay_identity_types::entities`
//! - DTOs: `gramstay_identity_types::dto`
//! - Errors: `gramstay_identity_types::Error`
//! - Config: `gramstay_identity_config::Config`

pub mod auth;
pub mod email;
pub mod id;
pub mod logging;
pub mod otp;
pub mod repository;
pub mod token;

pub use auth::{AuthService, IssuedChallenge};
pub use email::{EmailSender, EmailService, EmailTemplate, MockEmailSender, SmtpEmailService};
pub use id::IdGenerator;
pub use otp::OtpStore;
pub use repository::{AccountRepository, RevokedJtiRepository};
pub use token::{Claims, TokenIssuer, TokenPair};
