//! Business services containing domain logic and use cases.

pub mod otp;

// Re-export commonly used types
pub use otp::{
    CodeGenerator, DispatchReport, OtpService, OtpServiceConfig, OtpStore, SecureCodeGenerator,
    SmsDispatcher, StoreSelector,
};
