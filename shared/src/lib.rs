//! Shared configuration and utilities for the OTP service
//!
//! This crate provides common functionality used across all service crates:
//! - Environment-sourced configuration with bound validation
//! - Configuration error types
//! - Identifier masking for log output

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, OtpConfig, SmsGatewayConfig,
    SmsProvider,
};
pub use errors::{ConfigError, ConfigResult};
pub use utils::mask::mask_identifier;
