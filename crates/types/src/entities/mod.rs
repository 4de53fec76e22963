pub mod account;
pub mod otp_challenge;
pub mod pending_registration;

pub use account::{Account, normalize_email, validate_email};
pub use otp_challenge::{ChallengeOutcome, OtpChallenge, validate_code_format};
pub use pending_registration::PendingRegistration;
