//! Value objects exchanged between the orchestrator, the stores and callers.

pub mod backend;
pub mod otp_result;
pub mod verify_outcome;

pub use backend::{BackendState, StoreBackend};
pub use otp_result::{SendOtpResult, VerifyOtpResult};
pub use verify_outcome::VerifyOutcome;
