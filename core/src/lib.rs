//! # OTP Core
//!
//! Domain layer of the one-time-password service.
//! This crate contains the OTP record entity, verification outcomes, the code
//! generator, the store and dispatch contracts, and the orchestrating
//! `OtpService` that callers use to send and verify codes.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
