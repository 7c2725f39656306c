//! Configuration for the request dispatcher

use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::wakeup::WakeupMode;

/// Configuration for [`OnvifClient`](crate::OnvifClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bound applied to every exchange
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Pause between wakeup steps and before a preset retry
    /// Default: 1 second
    pub settle_delay: Duration,

    /// Warm-up chain issued before PTZ requests
    /// Default: none
    pub wakeup: WakeupMode,

    /// Refresh presets and retry once when GotoPreset reports an unknown token
    /// Default: true
    pub preset_recovery: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(1),
            wakeup: WakeupMode::None,
            preset_recovery: true,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_wakeup(mut self, wakeup: WakeupMode) -> Self {
        self.wakeup = wakeup;
        self
    }

    pub fn with_preset_recovery(mut self, enabled: bool) -> Self {
        self.preset_recovery = enabled;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(ApiError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.timeout > Duration::from_secs(300) {
            return Err(ApiError::Configuration(
                "Request timeout must not exceed 300 seconds".to_string(),
            ));
        }

        if self.settle_delay > Duration::from_secs(30) {
            return Err(ApiError::Configuration(
                "Settle delay must not exceed 30 seconds".to_string(),
            ));
        }

        Ok(())
    }
}
