//! OTP service module
//!
//! This module provides the complete one-time-password workflow:
//! - Cryptographically secure code generation
//! - Store and dispatch contracts implemented by the infrastructure layer
//! - Lazy, once-only backend selection
//! - `send` / `verify` orchestration with structured (never raising) results

mod code_generator;
mod config;
mod service;
mod traits;


pub use code_generator::{CodeGenerator, SecureCodeGenerator};
pub use config::OtpServiceConfig;
pub use service::OtpService;
pub use traits::{DispatchReport, OtpStore, SmsDispatcher, StoreSelector};
