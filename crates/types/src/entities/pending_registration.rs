use serde::{Deserialize, Serialize};

use super::otp_challenge::OtpChallenge;

/// Registration data waiting for email proof
///
/// The submitted profile and its challenge are one structured value stored
/// under a single key, so there is no window where one half exists without
/// the other. A repeated registration request overwrites the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingRegistration {
    /// Display name submitted by the applicant
    pub name: String,

    /// Normalized email the challenge was sent to
    pub email: String,

    /// The embedded one-time challenge
    pub challenge: OtpChallenge,
}

impl PendingRegistration {
    /// Create a pending registration around a fresh challenge
    pub fn new(name: String, email: String, challenge: OtpChallenge) -> Self {
        Self { name, email, challenge }
    }
}
