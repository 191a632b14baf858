//! Mock SMS dispatcher for development and testing
//!
//! Records every message in memory instead of sending it. With console output
//! enabled the message is printed to stdout so a developer can read the code.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use otp_core::services::{DispatchReport, SmsDispatcher};
use otp_shared::mask_identifier;

/// Mock SMS dispatcher
#[derive(Clone)]
pub struct MockSmsGateway {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Last message per identifier
    last_messages: Arc<Mutex<HashMap<String, String>>>,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
    /// Whether to print messages to console
    console_output: bool,
}

impl MockSmsGateway {
    /// Create a new mock dispatcher that prints to the console
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock dispatcher with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            last_messages: Arc::new(Mutex::new(HashMap::new())),
            simulate_failure,
            console_output,
        }
    }

    /// Get the total number of messages accepted
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Last message accepted for `identifier`
    pub fn last_message(&self, identifier: &str) -> Option<String> {
        self.last_messages
            .lock()
            .ok()
            .and_then(|messages| messages.get(identifier).cloned())
    }
}

impl Default for MockSmsGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsDispatcher for MockSmsGateway {
    async fn send_sms(&self, identifier: &str, message: &str) -> DispatchReport {
        let masked = mask_identifier(identifier);

        if self.simulate_failure {
            warn!(identifier = %masked, provider = "mock", "Mock SMS simulating failure");
            return DispatchReport::failed(
                "Failed to send OTP. Please try again.",
                "ERROR: simulated failure",
            );
        }

        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut messages) = self.last_messages.lock() {
            messages.insert(identifier.to_string(), message.to_string());
        }

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK SMS #{} to {}", count, masked);
            println!("{}", message);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            identifier = %masked,
            provider = "mock",
            message_length = message.len(),
            "SMS accepted (mock)"
        );

        DispatchReport::delivered(format!("100=mock-{}", count))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
