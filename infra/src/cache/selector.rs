//! Once-only choice between the Redis store and the in-memory fallback

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use otp_core::services::{OtpStore, StoreSelector};
use otp_shared::config::cache::mask_url;
use otp_shared::{CacheConfig, OtpConfig};

use super::memory_store::MemoryOtpStore;
use super::redis_client::RedisClient;
use super::redis_store::RedisOtpStore;
use crate::InfrastructureError;

/// Picks the primary store when it answers within the probe timeout,
/// otherwise the in-memory store with its sweeper running
pub struct BackendSelector {
    cache: CacheConfig,
    otp: OtpConfig,
}

impl BackendSelector {
    pub fn new(cache: CacheConfig, otp: OtpConfig) -> Self {
        Self { cache, otp }
    }

    /// Connect and probe the primary store
    pub async fn connect_primary(&self) -> Result<RedisOtpStore, InfrastructureError> {
        let client = RedisClient::connect(self.cache.clone()).await?;
        Ok(RedisOtpStore::new(
            client,
            self.otp.expiry_seconds,
            self.otp.max_attempts,
        ))
    }

    /// Liveness probe bounded by the configured probe timeout
    pub async fn is_live(&self, store: &dyn OtpStore) -> bool {
        tokio::time::timeout(self.cache.connection_timeout(), store.is_connected())
            .await
            .unwrap_or(false)
    }

    /// Build the fallback store and start its expiry sweep
    pub fn fallback_store(&self) -> Arc<MemoryOtpStore> {
        let store = Arc::new(MemoryOtpStore::new(
            self.otp.expiry_seconds,
            self.otp.max_attempts,
        ));
        if let Err(e) = store.start_sweeper(self.cache.sweep_interval()) {
            warn!(error = %e, "Failed to start OTP expiry sweeper");
        }
        store
    }
}

#[async_trait]
impl StoreSelector for BackendSelector {
    async fn select(&self) -> Arc<dyn OtpStore> {
        if !self.cache.enabled {
            info!("Redis disabled; using in-memory OTP store");
            return self.fallback_store();
        }

        match self.connect_primary().await {
            Ok(store) if self.is_live(&store).await => {
                info!(url = %mask_url(&self.cache.url), "Using Redis OTP store");
                Arc::new(store)
            }
            Ok(store) => {
                warn!(
                    url = %mask_url(&self.cache.url),
                    "Redis failed liveness probe; falling back to in-memory OTP store"
                );
                if let Err(e) = store.close().await {
                    warn!(error = %e, "Failed to release Redis connection");
                }
                self.fallback_store()
            }
            Err(e) => {
                warn!(
                    url = %mask_url(&self.cache.url),
                    error = %e,
                    "Redis unavailable; falling back to in-memory OTP store"
                );
                self.fallback_store()
            }
        }
    }
}
