//! HTTP GET SMS gateway client
//!
//! The gateway answers HTTP 200 for most failures and puts the error in the
//! body, so a dispatch only counts as delivered when the status is 2xx and the
//! body carries no failure marker. The request URL embeds the account
//! credentials and must never be logged.

use async_trait::async_trait;
use std::sync::RwLock;
use reqwest::{Client, StatusCode};
use tracing::{error, info, warn};

use otp_core::services::{DispatchReport, SmsDispatcher};
use otp_shared::{mask_identifier, SmsGatewayConfig};

use crate::InfrastructureError;

/// Case-insensitive body substrings that mark an in-band failure
pub const FAILURE_MARKERS: [&str; 3] = ["error", "fail", "invalid"];

pub const SEND_FAILED_MESSAGE: &str = "Failed to send OTP. Please try again.";
pub const TIMEOUT_MESSAGE: &str = "SMS service timeout. Please try again.";

/// Longest body excerpt included in a failure reason
const REASON_EXCERPT_CHARS: usize = 100;
/// Longest body excerpt written to the log
const LOG_EXCERPT_CHARS: usize = 200;

/// SMS dispatcher performing one GET per message, without retries
///
/// `close` drops the HTTP client; later dispatches fail without a request.
pub struct HttpSmsGateway {
    client: RwLock<Option<Client>>,
    config: SmsGatewayConfig,
}

impl HttpSmsGateway {
    /// Create a gateway client with the configured per-request timeout
    pub fn new(config: SmsGatewayConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client: RwLock::new(Some(client)),
            config,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .read()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }

    fn active_client(&self) -> Option<Client> {
        self.client.read().ok().and_then(|slot| slot.clone())
    }

    /// Query parameters for one dispatch, in the order the gateway documents them
    fn query_params<'a>(
        &'a self,
        identifier: &'a str,
        message: &'a str,
    ) -> [(&'static str, &'a str); 8] {
        [
            ("UserID", self.config.user_id.as_str()),
            ("UserPass", self.config.user_pass.as_str()),
            ("MobileNo", identifier),
            ("GSMID", self.config.gsm_id.as_str()),
            ("PEID", self.config.pe_id.as_str()),
            ("Message", message),
            ("TEMPID", self.config.template_id.as_str()),
            ("UNICODE", "TEXT"),
        ]
    }
}

/// Decide whether a gateway response means the message was accepted
///
/// Returns the failure reason when it was not. When `success_prefix` is set
/// the body must also start with it.
pub fn classify_response(
    status: StatusCode,
    body: &str,
    success_prefix: Option<&str>,
) -> Result<(), String> {
    if !status.is_success() {
        return Err(SEND_FAILED_MESSAGE.to_string());
    }

    let lowered = body.to_lowercase();
    let has_marker = FAILURE_MARKERS.iter().any(|marker| lowered.contains(marker));
    let missing_prefix =
        success_prefix.is_some_and(|prefix| !body.trim_start().starts_with(prefix));

    if has_marker || missing_prefix {
        return Err(format!("SMS API error: {}", excerpt(body, REASON_EXCERPT_CHARS)));
    }

    Ok(())
}

fn excerpt(body: &str, max_chars: usize) -> String {
    body.trim().chars().take(max_chars).collect()
}

#[async_trait]
impl SmsDispatcher for HttpSmsGateway {
    async fn send_sms(&self, identifier: &str, message: &str) -> DispatchReport {
        let masked = mask_identifier(identifier);

        let Some(client) = self.active_client() else {
            warn!(identifier = %masked, "SMS gateway client is closed");
            return DispatchReport::failed(SEND_FAILED_MESSAGE, "");
        };

        let response = match client
            .get(&self.config.base_url)
            .query(&self.query_params(identifier, message))
            .send()
            .await
        {
            Ok(response) => response,
            // reqwest errors print the request URL, credentials included
            Err(e) if e.is_timeout() => {
                error!(
                    identifier = %masked,
                    timeout_secs = self.config.request_timeout_secs,
                    "SMS API timeout"
                );
                return DispatchReport::failed(TIMEOUT_MESSAGE, "");
            }
            Err(e) => {
                error!(
                    identifier = %masked,
                    connect = e.is_connect(),
                    "SMS API request failed"
                );
                return DispatchReport::failed(SEND_FAILED_MESSAGE, "");
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!(
                    identifier = %masked,
                    status = status.as_u16(),
                    timeout = e.is_timeout(),
                    "Failed to read SMS API response"
                );
                return DispatchReport::failed(SEND_FAILED_MESSAGE, "");
            }
        };

        info!(
            identifier = %masked,
            status = status.as_u16(),
            body = %excerpt(&body, LOG_EXCERPT_CHARS),
            "SMS API response"
        );

        match classify_response(status, &body, self.config.success_prefix.as_deref()) {
            Ok(()) => DispatchReport::delivered(body),
            Err(reason) => {
                warn!(
                    identifier = %masked,
                    status = status.as_u16(),
                    "SMS API reported failure"
                );
                DispatchReport::failed(reason, body)
            }
        }
    }

    fn provider_name(&self) -> &str {
        "gateway"
    }

    fn is_configured(&self) -> bool {
        self.config.has_credentials()
    }

    async fn close(&self) {
        let taken = match self.client.write() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if taken.is_some() {
            info!("SMS gateway client closed");
        }
    }
}
