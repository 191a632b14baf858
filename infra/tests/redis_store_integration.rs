//! Integration tests for the Redis OTP store
//!
//! Require a running Redis server (`REDIS_URL`, default `redis://localhost:6379`).
//! Run with `cargo test -- --ignored`.

use std::sync::Arc;

use otp_core::domain::value_objects::{StoreBackend, VerifyOutcome};
use otp_core::services::OtpStore;
use otp_infra::cache::redis_store::hash_code;
use otp_infra::cache::{RedisClient, RedisOtpStore};
use otp_shared::CacheConfig;

async fn store(prefix: &str, ttl: u64, max_attempts: u32) -> RedisOtpStore {
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(prefix);
    let client = RedisClient::connect(config).await.unwrap();
    RedisOtpStore::new(client, ttl, max_attempts)
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_store_writes_both_keys_with_same_ttl() {
    let store = store("test:otp:ttl:", 120, 3).await;
    store.store("9876543210", "424242").await.unwrap();

    let code_ttl = store.client().ttl(&store.code_key("9876543210")).await.unwrap();
    let attempts_ttl = store.client().ttl(&store.attempts_key("9876543210")).await.unwrap();
    assert!(matches!(code_ttl, Some(t) if t > 100 && t <= 120));
    assert!(matches!(attempts_ttl, Some(t) if t > 100 && t <= 120));

    assert_eq!(store.backend(), StoreBackend::Primary);
    assert!(store.is_connected().await);
    assert_ne!(hash_code("424242"), "424242");

    store
        .client()
        .delete(&[store.code_key("9876543210"), store.attempts_key("9876543210")])
        .await
        .unwrap();
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_verify_outcomes_in_order() {
    let store = store("test:otp:flow:", 120, 2).await;
    let phone = "9876543211";

    assert_eq!(store.verify(phone, "424242").await.unwrap(), VerifyOutcome::NotFound);

    store.store(phone, "424242").await.unwrap();
    assert_eq!(
        store.verify(phone, "000000").await.unwrap(),
        VerifyOutcome::Mismatch { remaining: 1 }
    );
    assert_eq!(
        store.verify(phone, "000000").await.unwrap(),
        VerifyOutcome::Mismatch { remaining: 0 }
    );
    assert_eq!(store.verify(phone, "424242").await.unwrap(), VerifyOutcome::Exhausted);
    assert_eq!(store.verify(phone, "424242").await.unwrap(), VerifyOutcome::NotFound);

    store.store(phone, "424242").await.unwrap();
    assert_eq!(store.verify(phone, "424242").await.unwrap(), VerifyOutcome::Success);
    assert_eq!(store.verify(phone, "424242").await.unwrap(), VerifyOutcome::NotFound);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_restore_resets_attempts() {
    let store = store("test:otp:reset:", 120, 3).await;
    let phone = "9876543212";

    store.store(phone, "111111").await.unwrap();
    store.verify(phone, "000000").await.unwrap();
    store.store(phone, "222222").await.unwrap();

    assert_eq!(
        store.verify(phone, "000000").await.unwrap(),
        VerifyOutcome::Mismatch { remaining: 2 }
    );
    assert_eq!(store.verify(phone, "222222").await.unwrap(), VerifyOutcome::Success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires actual Redis server
async fn test_parallel_wrong_guesses_are_serialized() {
    let store = Arc::new(store("test:otp:race:", 120, 3).await);
    let phone = "9876543213";
    store.store(phone, "424242").await.unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.verify(phone, "000000").await.unwrap() })
        })
        .collect();

    let mut remaining = Vec::new();
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            VerifyOutcome::Mismatch { remaining: r } => remaining.push(r),
            VerifyOutcome::Exhausted => exhausted += 1,
            VerifyOutcome::NotFound => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    remaining.sort_unstable();
    assert_eq!(remaining, vec![0, 1, 2]);
    assert_eq!(exhausted, 1);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_closed_store_refuses_operations() {
    let store = store("test:otp:closed:", 120, 3).await;
    assert!(store.is_connected().await);

    store.close().await.unwrap();

    assert!(store.client().is_closed());
    assert!(!store.is_connected().await);
    assert!(store.store("9876543214", "424242").await.is_err());
    assert!(store.verify("9876543214", "424242").await.is_err());
    store.close().await.unwrap();
}
