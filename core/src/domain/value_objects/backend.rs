//! Store backend identity and orchestrator backend state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which OTP store implementation is serving requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Networked, TTL-native store (Redis)
    Primary,
    /// In-process store with manual expiry
    Fallback,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Primary => write!(f, "redis"),
            StoreBackend::Fallback => write!(f, "memory"),
        }
    }
}

/// Backend selection state of the orchestrator
///
/// Moves from `Uninitialized` to one of the active states exactly once and
/// stays there for the lifetime of the service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendState {
    Uninitialized,
    PrimaryActive,
    FallbackActive,
}

impl From<StoreBackend> for BackendState {
    fn from(backend: StoreBackend) -> Self {
        match backend {
            StoreBackend::Primary => BackendState::PrimaryActive,
            StoreBackend::Fallback => BackendState::FallbackActive,
        }
    }
}
