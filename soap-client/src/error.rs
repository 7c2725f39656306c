//! Error types for the SOAP client

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// The exchange did not complete within the configured bound
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure (refused, reset, DNS, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// Envelope could not be written or a document could not be read
    #[error("XML error: {0}")]
    Xml(String),
}

impl SoapError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SoapError::Timeout(_))
    }
}
