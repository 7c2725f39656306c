//! Single authenticated SOAP round trip
//!
//! An [`Exchange`] knows how to sign and post a request to a concrete URL.
//! It performs no resolution and no recovery; both the endpoint directory and
//! the dispatcher are built on top of it.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use soap_client::{Credentials, Envelope, Transport, UsernameToken};

use crate::error::{ApiError, Result};
use crate::reply::SoapReply;
use crate::request::ServiceRequest;
use crate::service::Service;

#[derive(Clone)]
pub struct Exchange {
    transport: Arc<dyn Transport>,
    credentials: Option<Credentials>,
}

impl Exchange {
    pub fn new(transport: Arc<dyn Transport>, credentials: Option<Credentials>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Post `request` to `url`, using `service` for the namespace.
    ///
    /// A fresh UsernameToken is generated for every call. With `addressing`
    /// set, WS-Addressing `Action`/`To` headers are added, which subscription
    /// managers require.
    ///
    /// Only timeouts, connection failures and envelope errors are returned as
    /// `Err`; faults come back inside the reply.
    pub async fn call(
        &self,
        url: &str,
        service: Service,
        request: &ServiceRequest,
        addressing: bool,
    ) -> Result<SoapReply> {
        let token = self
            .credentials
            .as_ref()
            .map(|c| UsernameToken::generate(c, Utc::now()));
        let soap_action = request.soap_action(service);
        let body = request.render_body(service);

        let mut envelope = Envelope::new(&body).with_security(token.as_ref());
        if addressing {
            envelope = envelope.with_addressing(&soap_action, url);
        }
        let xml = envelope
            .to_xml()
            .map_err(|e| ApiError::from_soap(&request.action, e))?;

        tracing::debug!(action = %request.action, %service, url, "sending request");

        let reply = self
            .transport
            .post(url, &soap_action, xml)
            .await
            .map_err(|e| ApiError::from_soap(&request.action, e))?;

        tracing::debug!(
            action = %request.action,
            status = reply.status,
            raw = %reply.body,
            "received response"
        );
        Ok(SoapReply::from_http(&request.action, reply))
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
