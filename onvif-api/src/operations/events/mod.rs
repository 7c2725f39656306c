//! WS-BaseNotification operations for ONVIF event subscriptions
//!
//! `Subscribe`, `Renew` and `Unsubscribe` live in the `wsnt` namespace;
//! `CreatePullPointSubscription` and `PullMessages` in the ONVIF events one.
//! Renew, Unsubscribe and PullMessages are posted to the subscription
//! manager URL returned when the subscription was created.

pub mod create_pull_point;
pub mod pull_messages;
pub mod renew;
pub mod subscribe;
pub mod unsubscribe;

pub use create_pull_point::{CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest};
pub use pull_messages::{NotificationMessage, PullMessagesOperation, PullMessagesRequest, PullMessagesResponse};
pub use renew::{RenewOperation, RenewRequest, RenewResponse};
pub use subscribe::{SubscribeOperation, SubscribeRequest};
pub use unsubscribe::UnsubscribeOperation;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use soap_client::{find_descendant, find_text, Element};

use crate::error::{ApiError, Result};

/// Parse a device-reported instant.
///
/// Accepts RFC 3339 with or without fractional seconds; a missing offset is
/// taken as UTC.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Fields shared by every subscription-creating response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionFields {
    /// `SubscriptionReference/Address`, the subscription manager URL
    pub address: String,
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
}

pub(crate) fn subscription_fields(action: &str, xml: &Element) -> Result<SubscriptionFields> {
    let address = find_descendant(xml, "SubscriptionReference")
        .and_then(|reference| find_text(reference, "Address"))
        .ok_or_else(|| ApiError::missing_field(action, "SubscriptionReference/Address"))?;

    Ok(SubscriptionFields {
        address,
        current_time: find_text(xml, "CurrentTime").and_then(|t| parse_instant(&t)),
        termination_time: find_text(xml, "TerminationTime").and_then(|t| parse_instant(&t)),
    })
}
