//! Caller-facing results of `send` and `verify`.

use serde::{Deserialize, Serialize};

use super::VerifyOutcome;

/// Result of issuing a code
///
/// Never carries the code itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOtpResult {
    /// Whether the code was delivered and stored
    pub success: bool,
    /// Human-readable status
    pub message: String,
}

impl SendOtpResult {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "OTP sent successfully".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result of verifying a code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOtpResult {
    /// Whether the code was accepted
    pub success: bool,
    /// Human-readable status
    pub message: String,
    /// Store outcome; `None` when the store itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<VerifyOutcome>,
}

impl VerifyOtpResult {
    /// Translate a store outcome into the caller-facing result
    pub fn from_outcome(outcome: VerifyOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.user_message(),
            outcome: Some(outcome),
        }
    }

    /// Result for an internal failure
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            outcome: None,
        }
    }

    /// Remaining attempts, when the failure was a mismatch
    pub fn remaining_attempts(&self) -> Option<u32> {
        self.outcome.and_then(|o| o.remaining_attempts())
    }
}

impl From<VerifyOutcome> for VerifyOtpResult {
    fn from(outcome: VerifyOutcome) -> Self {
        Self::from_outcome(outcome)
    }
}
