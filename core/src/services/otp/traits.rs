//! Traits for store, dispatch and backend-selection integration

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::value_objects::{StoreBackend, VerifyOutcome};
use crate::errors::DomainResult;

/// Persistence for outstanding OTP records
///
/// Implementations keep at most one record per identifier and evaluate
/// `verify` atomically with respect to concurrent calls for the same
/// identifier.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Upsert the record for `identifier`; TTL starts now and attempts reset to zero
    async fn store(&self, identifier: &str, code: &str) -> DomainResult<()>;

    /// Check existence, expiry, attempt budget and code equality, in that order
    async fn verify(&self, identifier: &str, code: &str) -> DomainResult<VerifyOutcome>;

    /// Which backend this is
    fn backend(&self) -> StoreBackend;

    /// Cheap liveness probe, consulted when the backend is selected; `false` once closed
    async fn is_connected(&self) -> bool {
        true
    }

    /// Release connections and stop background work
    async fn close(&self) -> DomainResult<()> {
        Ok(())
    }
}

/// Result of a single dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Whether the gateway accepted the message
    pub success: bool,
    /// Raw (possibly truncated) gateway response body
    pub raw_response: String,
    /// Human-readable failure reason, set when `success` is false
    pub reason: Option<String>,
}

impl DispatchReport {
    pub fn delivered(raw_response: impl Into<String>) -> Self {
        Self {
            success: true,
            raw_response: raw_response.into(),
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            success: false,
            raw_response: raw_response.into(),
            reason: Some(reason.into()),
        }
    }
}

/// Trait for SMS dispatch integration
///
/// Every failure (timeout, connection error, non-2xx, in-band error text) is
/// reported through `DispatchReport` rather than an error value.
#[async_trait]
pub trait SmsDispatcher: Send + Sync {
    /// Send `message` to `identifier`
    async fn send_sms(&self, identifier: &str, message: &str) -> DispatchReport;

    /// Provider name for log fields
    fn provider_name(&self) -> &str;

    /// Whether credentials required for dispatch are present
    fn is_configured(&self) -> bool {
        true
    }

    /// Release the underlying client
    async fn close(&self) {}
}

/// Resolves which store backs the service
///
/// Called at most once per `OtpService`, on first use.
#[async_trait]
pub trait StoreSelector: Send + Sync {
    async fn select(&self) -> Arc<dyn OtpStore>;
}
