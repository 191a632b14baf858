//! Primary OTP store backed by Redis
//!
//! Each identifier owns two keys sharing one TTL:
//! - `{prefix}{identifier}` holding the SHA-256 hex digest of the code
//! - `{prefix}attempts:{identifier}` holding the wrong-guess counter
//!
//! Verification runs as a single Lua script so concurrent guesses for the same
//! identifier are serialized by the server and the counter cannot lose updates.

use async_trait::async_trait;
use redis::Script;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use otp_core::domain::value_objects::{StoreBackend, VerifyOutcome};
use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::OtpStore;
use otp_shared::mask_identifier;

use super::redis_client::RedisClient;

/// Atomic verify: existence, attempt budget, code equality, in that order
///
/// Returns `{status, remaining}` where status is 0 = not found,
/// 2 = exhausted, 3 = mismatch, 4 = success. Expired keys are already gone,
/// so an expired record reports as not found.
const VERIFY_SCRIPT: &str = r#"
local stored = redis.call('GET', KEYS[1])
if not stored then
    return {0, 0}
end

local max_attempts = tonumber(ARGV[2])
local attempts = tonumber(redis.call('GET', KEYS[2]) or '0')

if attempts >= max_attempts then
    redis.call('DEL', KEYS[1], KEYS[2])
    return {2, 0}
end

if stored ~= ARGV[1] then
    attempts = redis.call('INCR', KEYS[2])
    local ttl = redis.call('PTTL', KEYS[1])
    if ttl > 0 then
        redis.call('PEXPIRE', KEYS[2], ttl)
    end
    return {3, max_attempts - attempts}
end

redis.call('DEL', KEYS[1], KEYS[2])
return {4, 0}
"#;

const STATUS_NOT_FOUND: i64 = 0;
const STATUS_EXHAUSTED: i64 = 2;
const STATUS_MISMATCH: i64 = 3;
const STATUS_SUCCESS: i64 = 4;

/// Redis-backed `OtpStore`
pub struct RedisOtpStore {
    client: RedisClient,
    ttl_seconds: u64,
    max_attempts: u32,
    verify_script: Script,
}

impl RedisOtpStore {
    /// Create a store over an already connected client
    pub fn new(client: RedisClient, ttl_seconds: u64, max_attempts: u32) -> Self {
        Self {
            client,
            ttl_seconds,
            max_attempts,
            verify_script: Script::new(VERIFY_SCRIPT),
        }
    }

    /// Key holding the hashed code
    pub fn code_key(&self, identifier: &str) -> String {
        self.client.make_key(identifier)
    }

    /// Key holding the attempt counter
    pub fn attempts_key(&self, identifier: &str) -> String {
        self.client.make_key(&format!("attempts:{}", identifier))
    }

    /// Underlying client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn decode(&self, status: i64, remaining: i64) -> DomainResult<VerifyOutcome> {
        match status {
            STATUS_NOT_FOUND => Ok(VerifyOutcome::NotFound),
            STATUS_EXHAUSTED => Ok(VerifyOutcome::Exhausted),
            STATUS_MISMATCH => Ok(VerifyOutcome::Mismatch {
                remaining: u32::try_from(remaining.max(0)).unwrap_or(0),
            }),
            STATUS_SUCCESS => Ok(VerifyOutcome::Success),
            other => Err(DomainError::Internal {
                message: format!("Unexpected verify script status {}", other),
            }),
        }
    }
}

/// SHA-256 hex digest of a code; the plain code never reaches Redis
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn store(&self, identifier: &str, code: &str) -> DomainResult<()> {
        let entries = [
            (self.code_key(identifier), hash_code(code)),
            (self.attempts_key(identifier), "0".to_string()),
        ];

        self.client
            .set_all_with_expiry(&entries, self.ttl_seconds)
            .await?;

        debug!(
            identifier = %mask_identifier(identifier),
            ttl_seconds = self.ttl_seconds,
            "Stored OTP in Redis"
        );
        Ok(())
    }

    async fn verify(&self, identifier: &str, code: &str) -> DomainResult<VerifyOutcome> {
        let keys = [self.code_key(identifier), self.attempts_key(identifier)];
        let args = [hash_code(code), self.max_attempts.to_string()];

        let (status, remaining): (i64, i64) = self
            .client
            .run_script(&self.verify_script, &keys, &args)
            .await?;

        self.decode(status, remaining)
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Primary
    }

    async fn is_connected(&self) -> bool {
        !self.client.is_closed() && matches!(self.client.ping().await, Ok(true))
    }

    async fn close(&self) -> DomainResult<()> {
        if self.client.close() {
            info!("Redis OTP store closed");
        }
        Ok(())
    }
}
