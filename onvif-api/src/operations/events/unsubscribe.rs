//! Unsubscribe operation for event subscriptions

use soap_client::{Element, WSNT_NS};

use crate::error::Result;
use crate::operation::{Acknowledged, OnvifOperation};
use crate::service::Service;

/// Unsubscribe operation
///
/// The response body carries nothing of interest.
pub struct UnsubscribeOperation;

impl OnvifOperation for UnsubscribeOperation {
    type Request = ();
    type Response = Acknowledged;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "Unsubscribe";
    const BODY_NAMESPACE: Option<&'static str> = Some(WSNT_NS);

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(Acknowledged)
    }

    fn empty_response() -> Option<Self::Response> {
        Some(Acknowledged)
    }
}
