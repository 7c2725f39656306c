//! CreatePullPointSubscription operation

use soap_client::Element;

use super::{subscription_fields, SubscriptionFields};
use crate::error::Result;
use crate::operation::OnvifOperation;
use crate::service::Service;
use crate::subscription::Ttl;

/// CreatePullPointSubscription operation
pub struct CreatePullPointSubscriptionOperation;

/// Request for CreatePullPointSubscription operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullPointSubscriptionRequest {
    pub ttl: Ttl,
}

impl OnvifOperation for CreatePullPointSubscriptionOperation {
    type Request = CreatePullPointSubscriptionRequest;
    type Response = SubscriptionFields;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "CreatePullPointSubscription";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<InitialTerminationTime>{}</InitialTerminationTime>",
            request.ttl
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        subscription_fields(Self::ACTION, xml)
    }
}
