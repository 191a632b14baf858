//! Configuration for the OTP service

use otp_shared::config::sms::OTP_PLACEHOLDER;
use otp_shared::{AppConfig, ConfigError, ConfigResult, OtpConfig, SmsGatewayConfig};

/// Configuration for the OTP orchestrator
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Code length, validity window and attempt budget
    pub otp: OtpConfig,
    /// Carrier-registered message template containing `{otp}`
    pub message_template: String,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            otp: OtpConfig::default(),
            message_template: SmsGatewayConfig::default().message_template,
        }
    }
}

impl OtpServiceConfig {
    /// Extract the orchestrator settings from the application configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            otp: config.otp.clone(),
            message_template: config.sms.message_template.clone(),
        }
    }

    /// Check bounds and the template placeholder
    pub fn validate(&self) -> ConfigResult<()> {
        self.otp.validate()?;
        if !self.message_template.contains(OTP_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                key: "SMS_OTP_MESSAGE_TEMPLATE".to_string(),
                value: format!("missing {} placeholder", OTP_PLACEHOLDER),
            });
        }
        Ok(())
    }

    /// Render the SMS body for a code
    pub fn render_message(&self, code: &str) -> String {
        self.message_template.replace(OTP_PLACEHOLDER, code)
    }
}
