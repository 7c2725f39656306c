use std::time::Duration;

use soap_client::SoapError;
use thiserror::Error;

/// High-level API errors for ONVIF operations
///
/// Each variant that stems from a network exchange carries the action that
/// failed, so a single line of output is enough to tell what went wrong.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid input
    ///
    /// Always raised before any network activity.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Capability and service listing both failed
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Connection-level failure (refused, reset, DNS, TLS)
    #[error("{action}: transport error: {message}")]
    Transport { action: String, message: String },

    /// The exchange exceeded the configured bound
    ///
    /// Never retried automatically.
    #[error("{action}: timed out after {after:?}")]
    Timeout { action: String, after: Duration },

    /// Malformed or unexpected response shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// SOAP fault or non-success HTTP status
    #[error("{action} failed (HTTP {status}): {reason}")]
    Fault {
        action: String,
        status: u16,
        code: String,
        reason: String,
    },

    /// The device still reports an unknown token after one refresh and retry
    #[error("{action}: token not recognised by the device after refreshing presets")]
    RecoverableToken { action: String },

    /// A field the caller cannot proceed without was absent
    #[error("{action}: response is missing {field}")]
    MissingField { action: String, field: String },

    /// Subscription lifecycle misuse, e.g. renewing a cancelled subscription
    #[error("Subscription error: {0}")]
    Subscription(String),
}

impl ApiError {
    /// Attach the failing action to a wire-level error
    pub fn from_soap(action: &str, error: SoapError) -> Self {
        match error {
            SoapError::Timeout(after) => ApiError::Timeout {
                action: action.to_string(),
                after,
            },
            SoapError::Transport(message) => ApiError::Transport {
                action: action.to_string(),
                message,
            },
            SoapError::Xml(message) => ApiError::Protocol(format!("{}: {}", action, message)),
        }
    }

    pub fn missing_field(action: &str, field: &str) -> Self {
        ApiError::MissingField {
            action: action.to_string(),
            field: field.to_string(),
        }
    }

    /// HTTP status of a fault reply, if this error came from one
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Fault { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ApiError::Fault { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ApiError::Configuration(_))
    }

    /// Transport and timeout failures mean the device could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Timeout { .. })
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
