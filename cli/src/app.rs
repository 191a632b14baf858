//! Service construction

use anyhow::Context;
use std::sync::Arc;

use otp_core::services::{OtpService, OtpServiceConfig};
use otp_infra::cache::BackendSelector;
use otp_infra::sms::create_sms_dispatcher;
use otp_shared::AppConfig;

/// Build the OTP service from validated configuration
///
/// Nothing connects here: the store backend is chosen on first use.
pub fn build_service(config: &AppConfig) -> anyhow::Result<OtpService> {
    let dispatcher =
        create_sms_dispatcher(&config.sms).context("Failed to create SMS dispatcher")?;
    let selector = Arc::new(BackendSelector::new(
        config.cache.clone(),
        config.otp.clone(),
    ));

    let service = OtpService::new(OtpServiceConfig::from_app_config(config), selector, dispatcher)
        .context("Failed to create OTP service")?;

    Ok(service)
}
