use chrono::{DateTime, Duration, Utc};
use gramstay_identity_const::{MAX_OTP_ATTEMPTS, OTP_CODE_LENGTH};
use serde::{Deserialize, Serialize};

/// A single-use numeric challenge scoped to one recipient
///
/// `OtpChallenge` is the single authority for code comparison, expiry, and
/// the failed-guess budget. Stores persist it as one JSON value so the code
/// and its attempt counter live and die together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpChallenge {
    /// The 6-digit code, string-encoded
    pub code: String,

    /// Failed guesses so far
    pub attempts: u32,

    /// When the code was generated
    pub issued_at: DateTime<Utc>,
}

/// Result of checking a submitted code against a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Code matched; the challenge must be destroyed by the caller
    Passed,
    /// The code's validity window has elapsed
    Expired,
    /// Wrong code; the updated attempt counter must be persisted
    Failed,
    /// Wrong code and the guess budget is spent; the challenge must be
    /// destroyed by the caller
    Exhausted,
}

impl OtpChallenge {
    /// Create a challenge around a freshly generated code
    pub fn new(code: String) -> Self {
        Self { code, attempts: 0, issued_at: Utc::now() }
    }

    /// Generate a 6-digit numeric code
    ///
    /// Uniformly sampled from `100000..=999999`, rejection-free. Codes prove
    /// control of an inbox within a short window; no cryptographic
    /// randomness guarantee is required.
    pub fn generate_code() -> String {
        use rand::Rng;
        let mut rng = rand::rng();
        rng.random_range(100_000..=999_999u32).to_string()
    }

    /// Check a submitted code, recording a failed guess on mismatch
    ///
    /// The caller owns persistence: `Passed` and `Exhausted` mean the entry
    /// must be deleted, `Failed` means the incremented counter must be
    /// written back (with the remaining TTL, never a fresh one).
    pub fn verify(&mut self, submitted: &str, ttl: Duration) -> ChallengeOutcome {
        if self.is_expired(ttl) {
            return ChallengeOutcome::Expired;
        }

        if submitted == self.code {
            return ChallengeOutcome::Passed;
        }

        self.attempts += 1;
        if self.attempts >= MAX_OTP_ATTEMPTS {
            ChallengeOutcome::Exhausted
        } else {
            ChallengeOutcome::Failed
        }
    }

    /// Whether the code's validity window has elapsed
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() > self.issued_at + ttl
    }

    /// Time left in a window that started at `issued_at`
    ///
    /// Used when writing a failed-guess update back to the store so the
    /// entry keeps its original deadline.
    pub fn remaining_ttl(&self, window: Duration) -> Duration {
        let deadline = self.issued_at + window;
        (deadline - Utc::now()).max(Duration::zero())
    }
}

/// Validates that a submitted code has the expected shape
///
/// Rejecting malformed input up front keeps format errors (400, naming the
/// field) distinct from wrong-guess errors, which burn an attempt.
pub fn validate_code_format(code: &str) -> crate::error::Result<()> {
    if code.is_empty() {
        return Err(crate::error::Error::validation("Code is required"));
    }
    if code.len() != OTP_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(crate::error::Error::validation(format!(
            "Code must be exactly {OTP_CODE_LENGTH} digits"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fresh(code: &str) -> OtpChallenge {
        OtpChallenge::new(code.to_string())
    }

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..100 {
            let code = OtpChallenge::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn test_correct_code_passes() {
        let mut challenge = fresh("123456");
        assert_eq!(challenge.verify("123456", Duration::minutes(5)), ChallengeOutcome::Passed);
        assert_eq!(challenge.attempts, 0);
    }

    #[test]
    fn test_wrong_code_increments_attempts() {
        let mut challenge = fresh("123456");
        assert_eq!(challenge.verify("000000", Duration::minutes(5)), ChallengeOutcome::Failed);
        assert_eq!(challenge.attempts, 1);
        // Code itself is untouched and still accepted
        assert_eq!(challenge.verify("123456", Duration::minutes(5)), ChallengeOutcome::Passed);
    }

    #[test]
    fn test_guess_budget_exhaustion() {
        let mut challenge = fresh("123456");
        for _ in 0..MAX_OTP_ATTEMPTS - 1 {
            assert_eq!(challenge.verify("000000", Duration::minutes(5)), ChallengeOutcome::Failed);
        }
        assert_eq!(challenge.verify("000000", Duration::minutes(5)), ChallengeOutcome::Exhausted);
        assert_eq!(challenge.attempts, MAX_OTP_ATTEMPTS);
    }

    #[test]
    fn test_expired_challenge() {
        let mut challenge = fresh("123456");
        challenge.issued_at = Utc::now() - Duration::minutes(6);
        assert_eq!(challenge.verify("123456", Duration::minutes(5)), ChallengeOutcome::Expired);
    }

    #[test]
    fn test_remaining_ttl_shrinks_with_age() {
        let mut challenge = fresh("123456");
        challenge.issued_at = Utc::now() - Duration::minutes(2);

        let remaining = challenge.remaining_ttl(Duration::minutes(5));
        assert!(remaining <= Duration::minutes(3));
        assert!(remaining > Duration::minutes(2));
    }

    #[test]
    fn test_remaining_ttl_never_negative() {
        let mut challenge = fresh("123456");
        challenge.issued_at = Utc::now() - Duration::minutes(10);
        assert_eq!(challenge.remaining_ttl(Duration::minutes(5)), Duration::zero());
    }

    #[test]
    fn test_code_format_validation() {
        assert!(validate_code_format("123456").is_ok());
        assert!(validate_code_format("").is_err());
        assert!(validate_code_format("12345").is_err());
        assert!(validate_code_format("1234567").is_err());
        assert!(validate_code_format("12345a").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let challenge = fresh("654321");
        let json = serde_json::to_string(&challenge).unwrap();
        let deserialized: OtpChallenge = serde_json::from_str(&json).unwrap();
        assert_eq!(challenge, deserialized);
    }

    mod proptest_codes {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn generated_codes_are_six_digits(_seed in 0u32..1000) {
                let code = OtpChallenge::generate_code();
                prop_assert_eq!(code.len(), 6);
                let n: u32 = code.parse().unwrap();
                prop_assert!((100_000..=999_999).contains(&n));
            }

            #[test]
            fn wrong_guesses_never_pass(guess in "[0-9]{6}") {
                let mut challenge = OtpChallenge::new("123456".to_string());
                prop_assume!(guess != "123456");
                let outcome = challenge.verify(&guess, Duration::minutes(5));
                prop_assert!(matches!(
                    outcome,
                    ChallengeOutcome::Failed | ChallengeOutcome::Exhausted
                ));
            }
        }
    }
}
