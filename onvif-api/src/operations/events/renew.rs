//! Renew operation for event subscriptions

use chrono::{DateTime, Utc};
use serde::Serialize;
use soap_client::{find_text, Element, WSNT_NS};

use super::parse_instant;
use crate::error::Result;
use crate::operation::OnvifOperation;
use crate::service::Service;
use crate::subscription::Ttl;

/// Renew operation
///
/// Posted to the subscription manager URL, never through discovery.
pub struct RenewOperation;

/// Request for Renew operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewRequest {
    pub ttl: Ttl,
}

/// Response for Renew operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewResponse {
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
}

impl OnvifOperation for RenewOperation {
    type Request = RenewRequest;
    type Response = RenewResponse;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "Renew";
    const BODY_NAMESPACE: Option<&'static str> = Some(WSNT_NS);

    fn build_payload(request: &Self::Request) -> String {
        format!("<TerminationTime>{}</TerminationTime>", request.ttl)
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        Ok(RenewResponse {
            current_time: find_text(xml, "CurrentTime").and_then(|t| parse_instant(&t)),
            termination_time: find_text(xml, "TerminationTime").and_then(|t| parse_instant(&t)),
        })
    }
}
