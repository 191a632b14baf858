//! OTP issuance and verification configuration

use serde::{Deserialize, Serialize};

use super::parse_or;
use crate::errors::{ConfigError, ConfigResult};

/// Allowed code lengths (inclusive)
pub const CODE_LENGTH_RANGE: (usize, usize) = (4, 8);

/// Allowed validity windows in seconds (inclusive)
pub const EXPIRY_SECONDS_RANGE: (u64, u64) = (60, 600);

/// Allowed attempt budgets (inclusive)
pub const MAX_ATTEMPTS_RANGE: (u32, u32) = (1, 5);

/// OTP settings shared by the generator, both stores and the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of decimal digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Validity window in seconds
    #[serde(default = "default_expiry_seconds")]
    pub expiry_seconds: u64,

    /// Maximum number of wrong guesses tolerated per code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            expiry_seconds: default_expiry_seconds(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Create from a key lookup function
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            code_length: parse_or(lookup, "OTP_LENGTH", default_code_length())?,
            expiry_seconds: parse_or(lookup, "OTP_EXPIRY_SECONDS", default_expiry_seconds())?,
            max_attempts: parse_or(lookup, "OTP_MAX_ATTEMPTS", default_max_attempts())?,
        })
    }

    /// Set the code length
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Set the validity window
    pub fn with_expiry_seconds(mut self, expiry_seconds: u64) -> Self {
        self.expiry_seconds = expiry_seconds;
        self
    }

    /// Set the attempt budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Check every value against its allowed range
    pub fn validate(&self) -> ConfigResult<()> {
        let (min, max) = CODE_LENGTH_RANGE;
        if !(min..=max).contains(&self.code_length) {
            return Err(ConfigError::out_of_range(
                "OTP_LENGTH",
                self.code_length as i64,
                min as i64,
                max as i64,
            ));
        }

        let (min, max) = EXPIRY_SECONDS_RANGE;
        if !(min..=max).contains(&self.expiry_seconds) {
            return Err(ConfigError::out_of_range(
                "OTP_EXPIRY_SECONDS",
                self.expiry_seconds as i64,
                min as i64,
                max as i64,
            ));
        }

        let (min, max) = MAX_ATTEMPTS_RANGE;
        if !(min..=max).contains(&self.max_attempts) {
            return Err(ConfigError::out_of_range("OTP_MAX_ATTEMPTS", self.max_attempts, min, max));
        }

        Ok(())
    }
}

fn default_code_length() -> usize {
    6
}

fn default_expiry_seconds() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OtpConfig::default().validate().is_ok());
    }

    #[test]
    fn test_code_length_bounds() {
        for length in 4..=8 {
            assert!(OtpConfig::default().with_code_length(length).validate().is_ok());
        }
        assert!(OtpConfig::default().with_code_length(3).validate().is_err());
        assert!(OtpConfig::default().with_code_length(9).validate().is_err());
    }

    #[test]
    fn test_expiry_bounds() {
        assert!(OtpConfig::default().with_expiry_seconds(60).validate().is_ok());
        assert!(OtpConfig::default().with_expiry_seconds(600).validate().is_ok());

        let err = OtpConfig::default().with_expiry_seconds(59).validate().unwrap_err();
        assert_eq!(err, ConfigError::out_of_range("OTP_EXPIRY_SECONDS", 59, 60, 600));
        assert!(OtpConfig::default().with_expiry_seconds(601).validate().is_err());
    }

    #[test]
    fn test_max_attempts_bounds() {
        assert!(OtpConfig::default().with_max_attempts(1).validate().is_ok());
        assert!(OtpConfig::default().with_max_attempts(5).validate().is_ok());
        assert!(OtpConfig::default().with_max_attempts(0).validate().is_err());
        assert!(OtpConfig::default().with_max_attempts(6).validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: OtpConfig = serde_json::from_str(r#"{"max_attempts": 2}"#).unwrap();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.expiry_seconds, 300);
        assert_eq!(config.max_attempts, 2);
    }
}
