//! OTP record entity: the state of one outstanding challenge.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::VerifyOutcome;

/// One outstanding one-time-password challenge for an identifier
///
/// At most one record exists per identifier; issuing a new code replaces the
/// previous record and resets `attempts` to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Destination the code was sent to (e.g. a mobile number)
    pub identifier: String,

    /// The numeric code
    pub code: String,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Wrong guesses recorded so far
    pub attempts: u32,
}

impl OtpRecord {
    /// Create a fresh record valid for `ttl_seconds` from now
    pub fn new(identifier: impl Into<String>, code: impl Into<String>, ttl_seconds: u64) -> Self {
        let issued_at = Utc::now();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            identifier: identifier.into(),
            code: code.into(),
            issued_at,
            expires_at: issued_at + Duration::seconds(ttl),
            attempts: 0,
        }
    }

    /// Checks if the record has expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the attempt budget is used up
    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    /// Attempts left before the record is invalidated
    pub fn remaining_attempts(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts)
    }

    /// Compare a candidate code in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        self.code.len() == candidate.len()
            && constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }

    /// Evaluate a verification attempt against this record
    ///
    /// Checks expiry, then the attempt budget, then the code. A mismatch
    /// increments `attempts`. The caller must delete the record whenever the
    /// returned outcome [`consumes_record`](VerifyOutcome::consumes_record).
    pub fn evaluate(&mut self, candidate: &str, max_attempts: u32, expired: bool) -> VerifyOutcome {
        if expired {
            return VerifyOutcome::Expired;
        }
        if self.is_exhausted(max_attempts) {
            return VerifyOutcome::Exhausted;
        }
        if !self.matches(candidate) {
            self.attempts += 1;
            return VerifyOutcome::Mismatch {
                remaining: self.remaining_attempts(max_attempts),
            };
        }
        VerifyOutcome::Success
    }
}
