//! Subscribe operation for WS-BaseNotification subscriptions

use soap_client::{escape, Element, WSNT_NS};

use super::{subscription_fields, SubscriptionFields};
use crate::error::Result;
use crate::operation::OnvifOperation;
use crate::service::Service;
use crate::subscription::Ttl;

/// Subscribe operation
///
/// With a consumer address the device pushes `Notify` messages there.
/// Without one the subscription is created for pull delivery.
pub struct SubscribeOperation;

/// Request for Subscribe operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    /// Push receiver URL
    pub consumer: Option<String>,
    pub ttl: Ttl,
}

impl OnvifOperation for SubscribeOperation {
    type Request = SubscribeRequest;
    type Response = SubscriptionFields;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "Subscribe";
    const BODY_NAMESPACE: Option<&'static str> = Some(WSNT_NS);

    fn build_payload(request: &Self::Request) -> String {
        let mut payload = String::new();
        if let Some(consumer) = &request.consumer {
            payload.push_str(&format!(
                "<ConsumerReference><wsa:Address>{}</wsa:Address></ConsumerReference>",
                escape(consumer)
            ));
        }
        payload.push_str(&format!(
            "<InitialTerminationTime>{}</InitialTerminationTime>",
            request.ttl
        ));
        payload
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        subscription_fields(Self::ACTION, xml)
    }
}
