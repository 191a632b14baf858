//! Integration tests for the send/verify flow over the in-memory store

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use otp_core::domain::value_objects::{BackendState, VerifyOutcome};
use otp_core::services::{
    CodeGenerator, DispatchReport, OtpService, OtpServiceConfig, OtpStore, SmsDispatcher,
    StoreSelector,
};
use otp_infra::cache::{BackendSelector, MemoryOtpStore};
use otp_infra::sms::MockSmsGateway;
use otp_shared::{CacheConfig, OtpConfig};

const PHONE: &str = "9876543210";

struct FixedCode(&'static str);

impl CodeGenerator for FixedCode {
    fn generate(&self, _length: usize) -> String {
        self.0.to_string()
    }
}

struct Prepared(Arc<MemoryOtpStore>);

#[async_trait]
impl StoreSelector for Prepared {
    async fn select(&self) -> Arc<dyn OtpStore> {
        self.0.clone()
    }
}

/// Dispatcher that fails and remembers what it was asked to send
struct RejectingGateway {
    attempts: Mutex<Vec<String>>,
}

#[async_trait]
impl SmsDispatcher for RejectingGateway {
    async fn send_sms(&self, identifier: &str, _message: &str) -> DispatchReport {
        self.attempts.lock().unwrap().push(identifier.to_string());
        DispatchReport::failed(
            "SMS API error: ERROR 105 invalid template",
            "ERROR 105 invalid template",
        )
    }

    fn provider_name(&self) -> &str {
        "rejecting"
    }
}

fn service_config(max_attempts: u32) -> OtpServiceConfig {
    OtpServiceConfig {
        otp: OtpConfig::default().with_max_attempts(max_attempts),
        ..Default::default()
    }
}

fn build(
    max_attempts: u32,
    dispatcher: Arc<dyn SmsDispatcher>,
) -> (OtpService, Arc<MemoryOtpStore>) {
    let store = Arc::new(MemoryOtpStore::new(300, max_attempts));
    let service = OtpService::new(
        service_config(max_attempts),
        Arc::new(Prepared(store.clone())),
        dispatcher,
    )
    .unwrap()
    .with_generator(Arc::new(FixedCode("424242")));
    (service, store)
}

#[tokio::test]
async fn test_end_to_end_send_mismatch_then_success() {
    let gateway = Arc::new(MockSmsGateway::with_options(false, false));
    let (service, store) = build(2, gateway.clone());

    let sent = service.send(PHONE).await;
    assert!(sent.success);
    assert_eq!(sent.message, "OTP sent successfully");

    let record = store.snapshot(PHONE).unwrap();
    assert_eq!(record.code, "424242");
    assert_eq!(record.attempts, 0);
    assert!(gateway.last_message(PHONE).unwrap().contains("424242"));

    let wrong = service.verify(PHONE, "000000").await;
    assert!(!wrong.success);
    assert!(wrong.message.ends_with("1 attempts remaining"));
    assert_eq!(store.snapshot(PHONE).unwrap().attempts, 1);

    let right = service.verify(PHONE, "424242").await;
    assert!(right.success);
    assert!(right.message.ends_with("verified"));
    assert!(store.snapshot(PHONE).is_none());

    service.close().await;
}

#[tokio::test]
async fn test_dispatch_failure_leaves_no_record() {
    let gateway = Arc::new(RejectingGateway {
        attempts: Mutex::new(Vec::new()),
    });
    let (service, store) = build(3, gateway.clone());

    let sent = service.send(PHONE).await;
    assert!(!sent.success);
    assert!(sent.message.starts_with("SMS API error"));
    assert_eq!(gateway.attempts.lock().unwrap().len(), 1);
    assert!(store.is_empty());

    let result = service.verify(PHONE, "424242").await;
    assert_eq!(result.outcome, Some(VerifyOutcome::NotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_wrong_guesses_respect_attempt_budget() {
    let gateway = Arc::new(MockSmsGateway::with_options(false, false));
    let (service, store) = build(3, gateway);
    let service = Arc::new(service);

    assert!(service.send(PHONE).await.success);

    let handles: Vec<_> = (0..24)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.verify(PHONE, "000000").await })
        })
        .collect();

    let mut remaining_reports = Vec::new();
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(!result.success);
        if let Some(remaining) = result.remaining_attempts() {
            remaining_reports.push(remaining);
        }
    }

    remaining_reports.sort_unstable();
    assert_eq!(remaining_reports, vec![0, 1, 2]);
    assert!(store.snapshot(PHONE).is_none());

    let late = service.verify(PHONE, "424242").await;
    assert!(!late.success);
}

#[tokio::test]
async fn test_disabled_redis_uses_fallback_for_whole_lifetime() {
    let config = service_config(3);
    let selector = BackendSelector::new(
        CacheConfig::default().with_enabled(false),
        config.otp.clone(),
    );
    let gateway = Arc::new(MockSmsGateway::with_options(false, false));
    let service = OtpService::new(config, Arc::new(selector), gateway.clone())
        .unwrap()
        .with_generator(Arc::new(FixedCode("135790")));

    assert_eq!(service.backend_state(), BackendState::Uninitialized);

    assert!(service.send(PHONE).await.success);
    assert_eq!(service.backend_state(), BackendState::FallbackActive);

    let result = service.verify(PHONE, "135790").await;
    assert!(result.success);
    assert_eq!(service.backend_state(), BackendState::FallbackActive);

    service.close().await;
}

#[tokio::test]
async fn test_unreachable_redis_demotes_once() {
    let config = service_config(3);
    let mut cache = CacheConfig::new("redis://127.0.0.1:1/0");
    cache.connection_timeout = 1;
    let selector = BackendSelector::new(cache, config.otp.clone());
    let gateway = Arc::new(MockSmsGateway::with_options(false, false));
    let service = OtpService::new(config, Arc::new(selector), gateway)
        .unwrap()
        .with_generator(Arc::new(FixedCode("246810")));

    assert!(service.send(PHONE).await.success);
    assert_eq!(service.backend_state(), BackendState::FallbackActive);
    assert!(service.verify(PHONE, "246810").await.success);

    service.close().await;
}

#[tokio::test]
async fn test_shutdown_stops_issuing_and_verifying() {
    let gateway = Arc::new(MockSmsGateway::with_options(false, false));
    let (service, store) = build(3, gateway.clone());
    store.start_sweeper(std::time::Duration::from_secs(60)).unwrap();

    assert!(service.send(PHONE).await.success);
    service.close().await;

    assert!(store.is_closed());
    assert!(!store.has_sweeper());

    let sent = service.send(PHONE).await;
    assert!(!sent.success);
    assert_eq!(gateway.get_message_count(), 1);
    assert!(store.is_empty());

    assert!(!service.verify(PHONE, "424242").await.success);
}
