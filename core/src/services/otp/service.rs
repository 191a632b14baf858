//! Main OTP service implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use otp_shared::mask_identifier;

use crate::domain::value_objects::{BackendState, SendOtpResult, VerifyOtpResult, VerifyOutcome};
use crate::errors::DomainResult;

use super::code_generator::{CodeGenerator, SecureCodeGenerator};
use super::config::OtpServiceConfig;
use super::traits::{OtpStore, SmsDispatcher, StoreSelector};

const SEND_FAILED_MESSAGE: &str = "Failed to send OTP. Please try again.";
const SMS_CONFIG_ERROR_MESSAGE: &str =
    "SMS service configuration error. Please check environment variables.";
const VERIFY_UNAVAILABLE_MESSAGE: &str = "Unable to verify OTP right now. Please try again.";

/// OTP orchestrator: sends codes and verifies them
///
/// The store backend is resolved through the `StoreSelector` on first use
/// and cached for the lifetime of the instance; there is no re-promotion
/// after a demotion to the fallback store. `send` and `verify` never return
/// errors, every failure becomes a `success = false` result. Once `close` has
/// run, both report failure without touching the store or the dispatcher.
pub struct OtpService {
    /// Service configuration
    config: OtpServiceConfig,
    /// Strategy used once to pick the store backend
    selector: Arc<dyn StoreSelector>,
    /// Active store, populated on first use
    store: OnceCell<Arc<dyn OtpStore>>,
    /// SMS dispatcher
    dispatcher: Arc<dyn SmsDispatcher>,
    /// Code generator
    generator: Arc<dyn CodeGenerator>,
    /// Set by `close`
    closed: AtomicBool,
}

impl OtpService {
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `config` - Validated against the configured bounds
    /// * `selector` - Backend selection strategy, invoked lazily
    /// * `dispatcher` - SMS dispatcher
    pub fn new(
        config: OtpServiceConfig,
        selector: Arc<dyn StoreSelector>,
        dispatcher: Arc<dyn SmsDispatcher>,
    ) -> DomainResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            selector,
            store: OnceCell::new(),
            dispatcher,
            generator: Arc::new(SecureCodeGenerator),
            closed: AtomicBool::new(false),
        })
    }

    /// Replace the code generator
    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Generate a code, dispatch it, and store it only if dispatch succeeded
    ///
    /// A failed dispatch leaves no record behind, so an undelivered code can
    /// never be verified. The returned message never contains the code.
    pub async fn send(&self, identifier: &str) -> SendOtpResult {
        let masked = Self::mask(identifier);

        if self.is_closed() {
            warn!(identifier = %masked, event = "otp_send_rejected", "OTP service is closed");
            return SendOtpResult::failed(SEND_FAILED_MESSAGE);
        }

        if identifier.trim().is_empty() {
            warn!(event = "otp_send_rejected", "Empty identifier supplied");
            return SendOtpResult::failed("A destination number is required.");
        }

        if !self.dispatcher.is_configured() {
            error!(
                event = "sms_credentials_missing",
                provider = self.dispatcher.provider_name(),
                "SMS credentials missing"
            );
            return SendOtpResult::failed(SMS_CONFIG_ERROR_MESSAGE);
        }

        let store = self.active_store().await;
        let code = self.generator.generate(self.config.otp.code_length);
        let message = self.config.render_message(&code);

        info!(
            identifier = %masked,
            event = "otp_dispatch",
            backend = %store.backend(),
            provider = self.dispatcher.provider_name(),
            "Sending OTP"
        );

        let report = self.dispatcher.send_sms(identifier, &message).await;
        if !report.success {
            let reason = report
                .reason
                .unwrap_or_else(|| SEND_FAILED_MESSAGE.to_string());
            warn!(
                identifier = %masked,
                event = "otp_dispatch_failed",
                reason = %reason,
                "OTP dispatch failed; nothing stored"
            );
            return SendOtpResult::failed(reason);
        }

        match store.store(identifier, &code).await {
            Ok(()) => {
                info!(
                    identifier = %masked,
                    event = "otp_sent",
                    expires_in = self.config.otp.expiry_seconds,
                    "OTP sent successfully"
                );
                SendOtpResult::sent()
            }
            Err(e) => {
                error!(
                    identifier = %masked,
                    event = "otp_storage_failed",
                    backend = %store.backend(),
                    error = %e,
                    "Failed to store OTP after dispatch"
                );
                SendOtpResult::failed(SEND_FAILED_MESSAGE)
            }
        }
    }

    /// Verify a supplied code against the outstanding record
    pub async fn verify(&self, identifier: &str, code: &str) -> VerifyOtpResult {
        let masked = Self::mask(identifier);

        if self.is_closed() {
            warn!(
                identifier = %masked,
                event = "otp_verification_rejected",
                "OTP service is closed"
            );
            return VerifyOtpResult::unavailable(VERIFY_UNAVAILABLE_MESSAGE);
        }

        let store = self.active_store().await;

        match store.verify(identifier, code).await {
            Ok(outcome) => {
                match outcome {
                    VerifyOutcome::Success => info!(
                        identifier = %masked,
                        event = "otp_verified",
                        outcome = %outcome,
                        "OTP verified"
                    ),
                    VerifyOutcome::Mismatch { remaining } => warn!(
                        identifier = %masked,
                        event = "otp_verification_failed",
                        outcome = %outcome,
                        remaining_attempts = remaining,
                        "OTP verification failed"
                    ),
                    _ => warn!(
                        identifier = %masked,
                        event = "otp_verification_failed",
                        outcome = %outcome,
                        "OTP verification failed"
                    ),
                }
                VerifyOtpResult::from_outcome(outcome)
            }
            Err(e) => {
                error!(
                    identifier = %masked,
                    event = "otp_verification_error",
                    backend = %store.backend(),
                    error = %e,
                    "Store error during OTP verification"
                );
                VerifyOtpResult::unavailable(VERIFY_UNAVAILABLE_MESSAGE)
            }
        }
    }

    /// Mask an identifier for logging (first 2 and last 4 characters visible)
    pub fn mask(identifier: &str) -> String {
        mask_identifier(identifier)
    }

    /// Current backend selection state
    pub fn backend_state(&self) -> BackendState {
        match self.store.get() {
            Some(store) => store.backend().into(),
            None => BackendState::Uninitialized,
        }
    }

    /// Validity window reported to callers
    pub fn expires_in_seconds(&self) -> u64 {
        self.config.otp.expiry_seconds
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the active store and the dispatcher
    ///
    /// Must be called at shutdown by whoever constructed the service. Later
    /// calls are no-ops.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(store) = self.store.get() {
            if let Err(e) = store.close().await {
                warn!(
                    backend = %store.backend(),
                    error = %e,
                    "Failed to close OTP store cleanly"
                );
            }
        }
        self.dispatcher.close().await;
        info!("OTP service closed");
    }

    /// Resolve the store on first use, then reuse it
    async fn active_store(&self) -> Arc<dyn OtpStore> {
        self.store
            .get_or_init(|| async {
                let store = self.selector.select().await;
                info!(
                    backend = %store.backend(),
                    event = "otp_store_selected",
                    "OTP store backend selected"
                );
                store
            })
            .await
            .clone()
    }
}
