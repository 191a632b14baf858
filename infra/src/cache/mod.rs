//! Cache module: OTP stores and backend selection
//!
//! - `RedisOtpStore` - primary store, TTL-native, atomic verify via Lua
//! - `MemoryOtpStore` - single-process fallback with a periodic sweep
//! - `BackendSelector` - decides between the two on first use

pub mod memory_store;
pub mod redis_client;
pub mod redis_store;
pub mod selector;
pub mod sweeper;


pub use memory_store::MemoryOtpStore;
pub use redis_client::RedisClient;
pub use redis_store::RedisOtpStore;
pub use selector::BackendSelector;
pub use sweeper::ExpirySweeper;

// Re-export commonly used types
pub use otp_shared::CacheConfig;
