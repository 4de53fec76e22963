use bon::bon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum display name length in characters
const MAX_NAME_LENGTH: usize = 100;

/// A registered account
///
/// Created only after the applicant proves control of the email address by
/// validating a one-time code. Email uniqueness is enforced at the storage
/// layer by the repository, not by this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Unique account ID (Snowflake ID)
    pub id: i64,

    /// Display name
    pub name: String,

    /// Normalized (trimmed, lowercased) email address
    pub email: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

#[bon]
impl Account {
    /// Create a new account
    ///
    /// The name is trimmed and the email normalized before validation.
    #[builder(on(String, into), finish_fn = create)]
    pub fn new(id: i64, name: String, email: String) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Name is required"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::validation(format!(
                "Name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }

        let email = normalize_email(&email);
        validate_email(&email)?;

        Ok(Self { id, name, email, created_at: Utc::now() })
    }
}

/// Normalize an email address for storage and lookup.
///
/// Lookups and storage always go through this, so `A@B.com` and `a@b.com`
/// address the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates the basic shape of an email address.
///
/// Real deliverability is proven by the one-time code, so this only rejects
/// obviously malformed input.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::validation("Email is required"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(Error::validation("Email must contain '@'"));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(Error::validation("Email address is malformed"));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(Error::validation("Email must not contain whitespace"));
    }

    Ok(())
}
