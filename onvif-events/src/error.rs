//! Error types for the onvif-events crate.

/// Errors from starting or stopping the renewal loop.
#[derive(Debug, thiserror::Error)]
pub enum RenewalError {
    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The subscription handed to the renewer was already cancelled
    #[error("Subscription already cancelled: {0}")]
    Cancelled(String),

    /// The background task did not stop cleanly
    #[error("Shutdown error: {0}")]
    Shutdown(String),
}

pub type Result<T> = std::result::Result<T, RenewalError>;
