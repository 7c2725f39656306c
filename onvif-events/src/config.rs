//! Configuration for the auto-renew loop

use std::time::Duration;

use onvif_api::Ttl;

use crate::error::{RenewalError, Result};

/// Configuration for [`AutoRenewer`](crate::AutoRenewer)
#[derive(Debug, Clone)]
pub struct RenewalConfig {
    /// Lifetime requested on every renew
    /// Default: 300 seconds
    pub renew_ttl: Ttl,

    /// Issue a final best-effort Unsubscribe when shutting down
    /// Default: true
    pub unsubscribe_on_exit: bool,

    /// How long `shutdown()` waits for the task, including the final unsubscribe
    /// Default: 15 seconds
    pub shutdown_grace: Duration,

    /// Capacity of the lifecycle event channel; events are dropped when full
    /// Default: 32
    pub event_buffer: usize,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            renew_ttl: Ttl::default(),
            unsubscribe_on_exit: true,
            shutdown_grace: Duration::from_secs(15),
            event_buffer: 32,
        }
    }
}

impl RenewalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.shutdown_grace.is_zero() {
            return Err(RenewalError::Configuration(
                "Shutdown grace period must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(RenewalError::Configuration(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_renew_ttl(mut self, ttl: Ttl) -> Self {
        self.renew_ttl = ttl;
        self
    }

    pub fn with_unsubscribe_on_exit(mut self, enabled: bool) -> Self {
        self.unsubscribe_on_exit = enabled;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }
}
