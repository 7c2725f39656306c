//! HTTP transport for SOAP exchanges

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::SoapError;

/// Default bound applied to every exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw HTTP response to a SOAP POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between request construction and the wire.
///
/// Any HTTP status is a successful exchange at this level; only timeouts
/// and connection failures are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        soap_action: &str,
        envelope: String,
    ) -> Result<HttpReply, SoapError>;
}

/// Build the SOAP 1.2 content type carrying the action URI
pub fn content_type(soap_action: &str) -> String {
    format!("application/soap+xml; charset=utf-8; action=\"{}\"", soap_action)
}

/// reqwest-backed transport with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl SoapClient {
    /// Create a new SOAP client with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> SoapError {
        if err.is_timeout() {
            SoapError::Timeout(self.timeout)
        } else {
            SoapError::Transport(err.to_string())
        }
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SoapClient {
    async fn post(
        &self,
        url: &str,
        soap_action: &str,
        envelope: String,
    ) -> Result<HttpReply, SoapError> {
        tracing::trace!(url, soap_action, "POST");

        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, content_type(soap_action))
            .body(envelope)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        tracing::trace!(url, status, bytes = body.len(), "response");
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_carries_action() {
        assert_eq!(
            content_type("http://www.onvif.org/ver20/ptz/wsdl/GotoPreset"),
            "application/soap+xml; charset=utf-8; action=\"http://www.onvif.org/ver20/ptz/wsdl/GotoPreset\""
        );
    }

    #[test]
    fn test_http_reply_success_range() {
        assert!(HttpReply::new(200, "").is_success());
        assert!(HttpReply::new(204, "").is_success());
        assert!(!HttpReply::new(400, "").is_success());
        assert!(!HttpReply::new(500, "").is_success());
    }

    #[test]
    fn test_soap_client_creation() {
        let client = SoapClient::with_timeout(Duration::from_secs(3));
        assert_eq!(client.timeout(), Duration::from_secs(3));
        assert_eq!(SoapClient::default().timeout(), DEFAULT_TIMEOUT);
    }
}
