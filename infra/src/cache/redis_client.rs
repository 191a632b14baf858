//! Redis client used by the primary OTP store
//!
//! Wraps a multiplexed connection with bounded connect-time retries. The
//! connection handle is cheap to clone, so every operation works on its own
//! clone and the client can be shared freely between tasks. `close` drops the
//! shared handle; every later operation fails with a client error.

use redis::{aio::MultiplexedConnection, Client, ErrorKind, FromRedisValue, RedisError, Script};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use otp_shared::config::cache::mask_url;
use otp_shared::CacheConfig;

use crate::InfrastructureError;

/// Redis cache client with retry logic
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection, `None` once closed
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of attempts for idempotent operations
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connect and verify the server answers, bounded by the configured probe timeout
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Connected client, or the reason the
    ///   primary store is unusable
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let timeout = config.connection_timeout();

        let client = tokio::time::timeout(timeout, Self::new_with_retry_config(config, 3, 100))
            .await
            .map_err(|_| InfrastructureError::Timeout(timeout))??;

        match tokio::time::timeout(timeout, client.ping()).await {
            Ok(Ok(true)) => Ok(client),
            Ok(Ok(false)) => Err(InfrastructureError::General(
                "Redis answered PING with an unexpected reply".to_string(),
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(InfrastructureError::Timeout(timeout)),
        }
    }

    /// Create a new Redis client with custom retry configuration
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    /// * `max_retries` - Maximum number of connection attempts
    /// * `retry_delay_ms` - Base delay between retries in milliseconds
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, max_retries, retry_delay_ms).await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection: Arc::new(RwLock::new(Some(connection))),
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Drop the connection shared by this client and all its clones
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        let taken = match self.connection.write() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if taken.is_some() {
            info!("Redis connection closed");
        }
        taken.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.connection
            .read()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }

    fn live_connection(&self) -> redis::RedisResult<MultiplexedConnection> {
        let slot = self.connection.read().map_err(|_| {
            RedisError::from((ErrorKind::ClientError, "Redis connection lock poisoned"))
        })?;
        slot.clone()
            .ok_or_else(|| RedisError::from((ErrorKind::ClientError, "Redis client is closed")))
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Prefixed key for `key`
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Write several string values under one TTL in a single MULTI/EXEC block
    ///
    /// Either every key is written with the new expiry or none is.
    pub async fn set_all_with_expiry(
        &self,
        entries: &[(String, String)],
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(expiry_seconds)
                .ignore();
        }

        self.execute_with_retry(|mut conn| {
            let pipe = pipe.clone();
            Box::pin(async move { pipe.query_async::<_, ()>(&mut conn).await })
        })
        .await
        .map_err(|e| {
            error!(keys = entries.len(), "Failed to write keys: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Delete keys, returning how many existed
    pub async fn delete(&self, keys: &[String]) -> Result<u32, InfrastructureError> {
        let keys = keys.to_vec();
        self.execute_with_retry(|mut conn| {
            let keys = keys.clone();
            Box::pin(async move {
                redis::cmd("DEL")
                    .arg(keys)
                    .query_async::<_, u32>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Remaining time-to-live of a key in seconds, `None` if missing or persistent
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let mut conn = self.live_connection()?;
        let ttl: i64 = redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)?;
        Ok((ttl >= 0).then_some(ttl))
    }

    /// Run a Lua script exactly once
    ///
    /// Scripts are not retried: a transport error after the server executed the
    /// script would otherwise apply its writes twice.
    pub async fn run_script<T: FromRedisValue>(
        &self,
        script: &Script,
        keys: &[String],
        args: &[String],
    ) -> Result<T, InfrastructureError> {
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }

        let mut conn = self.live_connection()?;
        invocation
            .invoke_async::<_, T>(&mut conn)
            .await
            .map_err(InfrastructureError::Cache)
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a single PING; no retries so the probe stays cheap.
    pub async fn ping(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.live_connection()?;
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                debug!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute an idempotent Redis operation with automatic retry logic
    async fn execute_with_retry<F, T>(&self, operation: F) -> redis::RedisResult<T>
    where
        F: Fn(
            MultiplexedConnection,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = redis::RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.live_connection()?;

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Check if a Redis error is transient and the operation may be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}
