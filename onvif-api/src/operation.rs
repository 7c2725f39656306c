use serde::Serialize;
use xmltree::Element;

use crate::error::Result;
use crate::request::ServiceRequest;
use crate::service::Service;

/// Base trait for all ONVIF operations
///
/// An operation pairs a typed request with the body it produces and a typed
/// response with the way it is read back. Payloads contain only the inner
/// elements; the dispatcher wraps them in the action element once the
/// service version is known.
pub trait OnvifOperation {
    /// The request type for this operation
    type Request;

    /// The response type for this operation, serializable for JSON output
    type Response: Serialize;

    /// The service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Fixed namespace for the action element, if it is not the service's own
    const BODY_NAMESPACE: Option<&'static str> = None;

    /// Build the inner elements of the request body
    ///
    /// Values taken from the request must be escaped with
    /// [`soap_client::escape`].
    fn build_payload(request: &Self::Request) -> String;

    /// Parse the first child of the SOAP body into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response>;

    /// Response to use when a successful reply carries no body element
    ///
    /// Operations whose reply is only an acknowledgement accept an empty
    /// body; everything else treats it as a protocol error.
    fn empty_response() -> Option<Self::Response> {
        None
    }

    /// Describe the exchange for the dispatcher
    fn request(request: &Self::Request) -> ServiceRequest {
        ServiceRequest::payload(Self::SERVICE, Self::ACTION, Self::build_payload(request))
            .with_body_namespace(Self::BODY_NAMESPACE)
    }
}

/// Response for operations that return nothing of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Acknowledged;

/// Format a duration as an ISO-8601 `PT{n}S` value
pub(crate) fn iso_seconds(duration: std::time::Duration) -> String {
    format!("PT{}S", duration.as_secs())
}
