//! In-process fallback OTP store
//!
//! Used when Redis is disabled or unreachable. A single mutex guards the whole
//! map, so every read-modify-write is serialized. Expiry is enforced lazily on
//! access and by a periodic sweep (`cleanup_expired`). After `close` the
//! store refuses further writes and reads.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use otp_core::domain::entities::OtpRecord;
use otp_core::domain::value_objects::{StoreBackend, VerifyOutcome};
use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::OtpStore;
use otp_shared::mask_identifier;

use super::sweeper::ExpirySweeper;

struct MemoryEntry {
    record: OtpRecord,
    deadline: Instant,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.deadline
    }
}

/// Mutex-guarded map of outstanding records
pub struct MemoryOtpStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    ttl: Duration,
    max_attempts: u32,
    sweeper: Mutex<Option<ExpirySweeper>>,
    closed: AtomicBool,
}

impl MemoryOtpStore {
    pub fn new(ttl_seconds: u64, max_attempts: u32) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
            max_attempts,
            sweeper: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Start the periodic expiry sweep
    ///
    /// The task holds only a weak reference and stops on `close` or once the
    /// store is dropped. Calling this twice keeps the first sweeper.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> DomainResult<()> {
        let mut slot = self.lock_sweeper()?;
        if slot.is_none() {
            *slot = Some(ExpirySweeper::spawn(Arc::downgrade(self), interval));
        }
        Ok(())
    }

    /// Remove every expired record, returning how many were removed
    pub fn cleanup_expired(&self) -> DomainResult<usize> {
        let now = Instant::now();
        let mut entries = self.lock_entries()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Swept expired OTP records");
        }
        Ok(removed)
    }

    /// Copy of the record currently held for `identifier`, expired or not
    pub fn snapshot(&self, identifier: &str) -> Option<OtpRecord> {
        self.lock_entries()
            .ok()
            .and_then(|entries| entries.get(identifier).map(|e| e.record.clone()))
    }

    /// Number of records held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.lock_entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a sweeper task is attached
    pub fn has_sweeper(&self) -> bool {
        self.lock_sweeper().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.is_closed() {
            return Err(DomainError::store("in-memory OTP store is closed"));
        }
        Ok(())
    }

    fn lock_entries(&self) -> DomainResult<MutexGuard<'_, HashMap<String, MemoryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| DomainError::store("in-memory OTP store lock poisoned"))
    }

    fn lock_sweeper(&self) -> DomainResult<MutexGuard<'_, Option<ExpirySweeper>>> {
        self.sweeper
            .lock()
            .map_err(|_| DomainError::store("in-memory OTP sweeper lock poisoned"))
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn store(&self, identifier: &str, code: &str) -> DomainResult<()> {
        self.ensure_open()?;
        let entry = MemoryEntry {
            record: OtpRecord::new(identifier, code, self.ttl.as_secs()),
            deadline: Instant::now() + self.ttl,
        };
        self.lock_entries()?.insert(identifier.to_string(), entry);

        debug!(
            identifier = %mask_identifier(identifier),
            ttl_seconds = self.ttl.as_secs(),
            "Stored OTP in memory"
        );
        Ok(())
    }

    async fn verify(&self, identifier: &str, code: &str) -> DomainResult<VerifyOutcome> {
        self.ensure_open()?;
        let mut entries = self.lock_entries()?;

        let Some(entry) = entries.get_mut(identifier) else {
            return Ok(VerifyOutcome::NotFound);
        };

        let expired = entry.is_expired(Instant::now());
        let outcome = entry.record.evaluate(code, self.max_attempts, expired);
        if outcome.consumes_record() {
            entries.remove(identifier);
        }
        Ok(outcome)
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Fallback
    }

    async fn is_connected(&self) -> bool {
        !self.is_closed()
    }

    async fn close(&self) -> DomainResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let sweeper = self.lock_sweeper()?.take();
        if let Some(sweeper) = sweeper {
            sweeper.stop().await;
        }

        let dropped = {
            let mut entries = self.lock_entries()?;
            let count = entries.len();
            entries.clear();
            count
        };
        info!(dropped, "In-memory OTP store closed");
        Ok(())
    }
}
