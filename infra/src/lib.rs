//! # Infrastructure Layer
//!
//! Concrete implementations of the OTP store and SMS dispatch contracts
//! defined in `otp_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis-backed primary store, in-memory fallback store with a
//!   periodic expiry sweeper, and the once-only backend selector
//! - **SMS**: HTTP GET gateway client and a recording mock dispatcher

// Re-export core types for convenience
pub use otp_core::errors::*;

/// Cache module - Redis client, OTP stores and backend selection
pub mod cache;

/// SMS module - gateway dispatcher implementations
pub mod sms;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded its time bound
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Cache(_) | InfrastructureError::Timeout(_) => {
                DomainError::store(err)
            }
            InfrastructureError::Http(_) | InfrastructureError::Sms(_) => DomainError::Dispatch {
                message: err.to_string(),
            },
            InfrastructureError::Config(message) => DomainError::Validation { message },
            InfrastructureError::General(message) => DomainError::Internal { message },
        }
    }
}
