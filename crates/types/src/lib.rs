#![deny(unsafe_code)]

//! # Gramstay Identity Types
//!
//! Shared types for the identity service: the error taxonomy, domain
//! entities, and HTTP DTOs.
//!
//! ## Imports
//!
//! Import types from their source modules:
//! - Entities: `gramstay_identity_types::entities`
//! - DTOs: `gramstay_identity_types::dto`
//! - Errors: `gramstay_identity_types::Error`

pub mod dto;
pub mod entities;
pub mod error;

pub use error::{Error, Result};
