//! Domain-specific error types and error handling.

use otp_shared::ConfigError;
use thiserror::Error;

/// Core domain errors
///
/// None of these reach the caller of `OtpService`; they are converted into
/// structured `(success = false, message)` results at that boundary.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Dispatch error: {message}")]
    Dispatch { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DomainError {
    /// Build a store error from anything printable
    pub fn store(message: impl std::fmt::Display) -> Self {
        DomainError::Store {
            message: message.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
