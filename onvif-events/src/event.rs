//! Lifecycle events emitted by the renewal loop

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// What happened to the subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalEvent {
    /// The device accepted a renew
    Renewed {
        /// New termination time, when the device reported one
        termination: Option<DateTime<Utc>>,
        next_in: Duration,
    },
    RenewFailed { error: String, next_in: Duration },
    /// Final unsubscribe on shutdown
    Unsubscribed { acknowledged: bool },
    /// The loop has exited; no further events follow
    Stopped,
}

impl fmt::Display for RenewalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenewalEvent::Renewed { termination: Some(at), next_in } => write!(
                f,
                "renewed until {}, next renewal in {}s",
                at.to_rfc3339(),
                next_in.as_secs()
            ),
            RenewalEvent::Renewed { termination: None, next_in } => {
                write!(f, "renewed, next renewal in {}s", next_in.as_secs())
            }
            RenewalEvent::RenewFailed { error, next_in } => {
                write!(f, "renew failed ({}), retrying in {}s", error, next_in.as_secs())
            }
            RenewalEvent::Unsubscribed { acknowledged: true } => f.write_str("unsubscribed"),
            RenewalEvent::Unsubscribed { acknowledged: false } => {
                f.write_str("unsubscribe not acknowledged")
            }
            RenewalEvent::Stopped => f.write_str("auto-renew stopped"),
        }
    }
}
