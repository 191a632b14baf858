//! Primary store (Redis) and fallback store configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_bool_or, parse_or, string_or};
use crate::errors::{ConfigError, ConfigResult};

/// Redis-backed OTP store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL (`redis://[:password@]host:port/db`)
    #[serde(default = "default_url")]
    pub url: String,

    /// Prefix prepended to every OTP key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Whether the primary store should be attempted at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Bound on the startup connectivity probe, in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Interval between fallback-store expiry sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            key_prefix: default_key_prefix(),
            enabled: default_enabled(),
            connection_timeout: default_connection_timeout(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl CacheConfig {
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
            url: string_or(lookup, "REDIS_URL", &default_url()),
            key_prefix: string_or(lookup, "REDIS_OTP_PREFIX", &default_key_prefix()),
            enabled: parse_bool_or(lookup, "REDIS_ENABLED", default_enabled())?,
            connection_timeout: parse_or(
                lookup,
                "REDIS_CONNECT_TIMEOUT_SECS",
                default_connection_timeout(),
            )?,
            sweep_interval: parse_or(lookup, "OTP_SWEEP_INTERVAL_SECS", default_sweep_interval())?,
        })
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all OTP keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Enable or disable the primary store
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Probe timeout as a `Duration`
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }

    /// Sweep interval as a `Duration`
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "REDIS_URL".to_string(),
            });
        }
        if self.connection_timeout == 0 {
            return Err(ConfigError::out_of_range(
                "REDIS_CONNECT_TIMEOUT_SECS",
                0,
                1,
                i64::from(u32::MAX),
            ));
        }
        if self.sweep_interval == 0 {
            return Err(ConfigError::out_of_range(
                "OTP_SWEEP_INTERVAL_SECS",
                0,
                1,
                i64::from(u32::MAX),
            ));
        }
        Ok(())
    }
}

/// Mask the password portion of a Redis URL for logging
pub fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://****{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

fn default_url() -> String {
    String::from("redis://localhost:6379/0")
}

fn default_key_prefix() -> String {
    String::from("otp:")
}

fn default_enabled() -> bool {
    true
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_sweep_interval() -> u64 {
    60
}
