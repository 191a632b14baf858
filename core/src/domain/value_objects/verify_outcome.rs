//! Outcome of a single verification attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of checking a supplied code against the stored record
///
/// Store implementations evaluate existence, expiry, attempt budget and code
/// equality in that order and report exactly one of these outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// No record for the identifier (never issued, consumed, or expired away)
    NotFound,
    /// Record exists but its validity window has elapsed; record deleted
    Expired,
    /// Attempt budget used up; record deleted
    Exhausted,
    /// Wrong code; one attempt recorded
    Mismatch { remaining: u32 },
    /// Correct code; record deleted
    Success,
}

impl VerifyOutcome {
    /// Whether the supplied code was accepted
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Success)
    }

    /// Whether the store must delete the record after this outcome
    pub fn consumes_record(&self) -> bool {
        matches!(
            self,
            VerifyOutcome::Expired | VerifyOutcome::Exhausted | VerifyOutcome::Success
        )
    }

    /// Remaining attempts, only reported on mismatch
    pub fn remaining_attempts(&self) -> Option<u32> {
        match self {
            VerifyOutcome::Mismatch { remaining } => Some(*remaining),
            _ => None,
        }
    }

    /// Stable name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::NotFound => "not_found",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::Exhausted => "exhausted",
            VerifyOutcome::Mismatch { .. } => "mismatch",
            VerifyOutcome::Success => "success",
        }
    }

    /// Caller-facing message for this outcome
    pub fn user_message(&self) -> String {
        match self {
            VerifyOutcome::NotFound => {
                "OTP not found or expired. Please request a new OTP.".to_string()
            }
            VerifyOutcome::Expired => "OTP has expired. Please request a new OTP.".to_string(),
            VerifyOutcome::Exhausted => {
                "Too many failed attempts. Please request a new OTP.".to_string()
            }
            VerifyOutcome::Mismatch { remaining } => {
                format!("Invalid OTP. {} attempts remaining", remaining)
            }
            VerifyOutcome::Success => "OTP successfully verified".to_string(),
        }
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumes_record() {
        assert!(!VerifyOutcome::NotFound.consumes_record());
        assert!(VerifyOutcome::Expired.consumes_record());
        assert!(VerifyOutcome::Exhausted.consumes_record());
        assert!(!VerifyOutcome::Mismatch { remaining: 1 }.consumes_record());
        assert!(VerifyOutcome::Success.consumes_record());
    }

    #[test]
    fn test_user_messages() {
        assert!(VerifyOutcome::NotFound.user_message().contains("request a new OTP"));
        assert!(VerifyOutcome::Expired.user_message().contains("request a new OTP"));
        assert!(VerifyOutcome::Exhausted.user_message().contains("Too many failed attempts"));
        assert_eq!(
            VerifyOutcome::Mismatch { remaining: 2 }.user_message(),
            "Invalid OTP. 2 attempts remaining"
        );
        assert!(VerifyOutcome::Success.user_message().ends_with("verified"));
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_string(&VerifyOutcome::Mismatch { remaining: 1 }).unwrap();
        assert_eq!(json, r#"{"outcome":"mismatch","remaining":1}"#);
    }
}
