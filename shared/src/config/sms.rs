//! SMS gateway configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use super::{parse_or, string_or};
use crate::errors::{ConfigError, ConfigResult};

/// Placeholder substituted with the generated code in the message template
pub const OTP_PLACEHOLDER: &str = "{otp}";

/// Which dispatcher implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// HTTP GET gateway (onlysms-style)
    Gateway,
    /// In-process recorder for development
    Mock,
}

impl Default for SmsProvider {
    fn default() -> Self {
        SmsProvider::Gateway
    }
}

impl FromStr for SmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gateway" | "http" | "onlysms" => Ok(SmsProvider::Gateway),
            "mock" => Ok(SmsProvider::Mock),
            _ => Err(format!("Invalid SMS provider: {}", s)),
        }
    }
}

/// SMS gateway configuration
///
/// The message template is registered with the carrier (DLT) together with
/// `template_id`; the rendered text must match it exactly or the gateway
/// drops the message without reporting an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SmsGatewayConfig {
    /// Dispatcher implementation
    #[serde(default)]
    pub provider: SmsProvider,

    /// Gateway endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Gateway account id
    #[serde(default)]
    pub user_id: String,

    /// Gateway account password
    #[serde(default)]
    pub user_pass: String,

    /// Sender id shown on the handset
    #[serde(default = "default_gsm_id")]
    pub gsm_id: String,

    /// DLT principal entity id
    #[serde(default = "default_pe_id")]
    pub pe_id: String,

    /// DLT template id
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Message body with an `{otp}` placeholder
    #[serde(default = "default_message_template")]
    pub message_template: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Optional prefix a successful response body must start with
    #[serde(default)]
    pub success_prefix: Option<String>,
}

impl Default for SmsGatewayConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::default(),
            base_url: default_base_url(),
            user_id: String::new(),
            user_pass: String::new(),
            gsm_id: default_gsm_id(),
            pe_id: default_pe_id(),
            template_id: default_template_id(),
            message_template: default_message_template(),
            request_timeout_secs: default_request_timeout(),
            success_prefix: None,
        }
    }
}

impl SmsGatewayConfig {
    /// Create from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Create from a key lookup function
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("SMS_PROVIDER") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse().map_err(|_| ConfigError::Invalid {
                    key: "SMS_PROVIDER".to_string(),
                    value: raw,
                })?
            }
            _ => SmsProvider::default(),
        };

        Ok(Self {
            provider,
            base_url: string_or(lookup, "SMS_API_BASE_URL", &default_base_url()),
            user_id: string_or(lookup, "SMS_USER_ID", ""),
            user_pass: string_or(lookup, "SMS_USER_PASS", ""),
            gsm_id: string_or(lookup, "SMS_GSM_ID", &default_gsm_id()),
            pe_id: string_or(lookup, "SMS_PE_ID", &default_pe_id()),
            template_id: string_or(lookup, "SMS_TEMPLATE_ID", &default_template_id()),
            message_template: string_or(
                lookup,
                "SMS_OTP_MESSAGE_TEMPLATE",
                &default_message_template(),
            ),
            request_timeout_secs: parse_or(
                lookup,
                "SMS_REQUEST_TIMEOUT_SECS",
                default_request_timeout(),
            )?,
            success_prefix: lookup("SMS_SUCCESS_PREFIX").filter(|p| !p.is_empty()),
        })
    }

    /// Whether both gateway credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.user_id.is_empty() && !self.user_pass.is_empty()
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.message_template.contains(OTP_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                key: "SMS_OTP_MESSAGE_TEMPLATE".to_string(),
                value: format!("missing {} placeholder", OTP_PLACEHOLDER),
            });
        }
        if self.provider == SmsProvider::Gateway && self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "SMS_API_BASE_URL".to_string(),
            });
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ConfigError::out_of_range(
                "SMS_REQUEST_TIMEOUT_SECS",
                self.request_timeout_secs as i64,
                1,
                120,
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    String::from("https://onlysms.co.in/api/otp.aspx")
}

fn default_gsm_id() -> String {
    String::from("linQMD")
}

fn default_pe_id() -> String {
    String::from("1701171921100574462")
}

fn default_template_id() -> String {
    String::from("1707172361651556820")
}

fn default_message_template() -> String {
    String::from(
        "Hi! OTP for booking an appointment with LinQMD is: {otp}. \
         Please do not share it with anyone. linQMD.",
    )
}

fn default_request_timeout() -> u64 {
    30
}
