//! Unit tests for domain error types

use otp_shared::ConfigError;

use crate::errors::DomainError;

#[test]
fn test_store_error_message() {
    let error = DomainError::store("connection reset");
    assert_eq!(error.to_string(), "Store error: connection reset");
}

#[test]
fn test_config_error_is_transparent() {
    let error: DomainError = ConfigError::Missing {
        key: "REDIS_URL".to_string(),
    }
    .into();
    assert_eq!(error.to_string(), "Missing required setting: REDIS_URL");
}

#[test]
fn test_validation_error_message() {
    let error = DomainError::Validation {
        message: "identifier is empty".to_string(),
    };
    assert!(error.to_string().contains("identifier is empty"));
}
