//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    Missing { key: String },

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },

    #[error("{key} out of range: {value} (min: {min}, max: {max})")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ConfigError {
    /// Build an out-of-range error for an integer setting
    pub fn out_of_range(
        key: &str,
        value: impl Into<i64>,
        min: impl Into<i64>,
        max: impl Into<i64>,
    ) -> Self {
        ConfigError::OutOfRange {
            key: key.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
