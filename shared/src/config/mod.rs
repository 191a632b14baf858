//! Configuration module with per-concern sub-modules
//!
//! - `otp` - code length, validity window and attempt budget
//! - `cache` - primary (Redis) store connection and fallback sweep settings
//! - `sms` - SMS gateway credentials, DLT identifiers and message template
//! - `environment` - environment detection and logging configuration
//!
//! Every sub-configuration can be built from the process environment with
//! `from_env()` or from an arbitrary key lookup with `from_lookup()`, which is
//! what the tests use to avoid touching process-wide state.

pub mod cache;
pub mod environment;
pub mod otp;
pub mod sms;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{ConfigError, ConfigResult};

pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use sms::{SmsGatewayConfig, SmsProvider};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// OTP issuance and verification settings
    #[serde(default)]
    pub otp: OtpConfig,

    /// Primary store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// SMS gateway configuration
    #[serde(default)]
    pub sms: SmsGatewayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the full configuration from a key lookup function
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);

        Ok(Self {
            environment,
            otp: OtpConfig::from_lookup(&lookup)?,
            cache: CacheConfig::from_lookup(&lookup)?,
            sms: SmsGatewayConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup, environment)?,
        })
    }

    /// Validate all sub-configurations
    ///
    /// Production additionally requires gateway credentials when the real
    /// gateway provider is selected.
    pub fn validate(&self) -> ConfigResult<()> {
        self.otp.validate()?;
        self.cache.validate()?;
        self.sms.validate()?;

        if self.environment.is_production()
            && self.sms.provider == SmsProvider::Gateway
            && !self.sms.has_credentials()
        {
            return Err(ConfigError::Missing {
                key: "SMS_USER_ID/SMS_USER_PASS".to_string(),
            });
        }

        Ok(())
    }
}

/// Read and parse a setting, falling back to `default` when the key is unset or blank
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            })
        }
        _ => Ok(default),
    }
}

/// Read a boolean setting accepting the usual spellings
pub(crate) fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> ConfigResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
        },
        None => Ok(default),
    }
}

/// Read a string setting with a default
pub(crate) fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}
