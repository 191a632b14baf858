//! SMS Module
//!
//! Dispatcher implementations for delivering OTP messages:
//!
//! - **Gateway**: single HTTP GET per message with a bounded timeout
//! - **Mock**: in-memory recorder for development
//!
//! Both report failures through `DispatchReport` and never return errors.

pub mod gateway;
pub mod mock_sms;

pub use gateway::{classify_response, HttpSmsGateway};
pub use mock_sms::MockSmsGateway;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use otp_core::services::SmsDispatcher;
use otp_shared::{SmsGatewayConfig, SmsProvider};

use crate::InfrastructureError;

/// Create an SMS dispatcher based on configuration
///
/// # Arguments
///
/// * `config` - SMS configuration containing provider settings
///
/// # Returns
///
/// A shared dispatcher, or an error if the HTTP client cannot be built
pub fn create_sms_dispatcher(
    config: &SmsGatewayConfig,
) -> Result<Arc<dyn SmsDispatcher>, InfrastructureError> {
    match config.provider {
        SmsProvider::Gateway => {
            if !config.has_credentials() {
                tracing::warn!("SMS gateway credentials missing; sends will be rejected");
            }
            Ok(Arc::new(HttpSmsGateway::new(config.clone())?))
        }
        SmsProvider::Mock => {
            tracing::info!("Using mock SMS dispatcher");
            Ok(Arc::new(MockSmsGateway::new()))
        }
    }
}
