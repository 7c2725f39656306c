//! PullMessages operation for pull-point subscriptions

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use soap_client::{child_elements, find_all, find_descendant, find_text, Element};

use super::parse_instant;
use crate::error::Result;
use crate::operation::{iso_seconds, OnvifOperation};
use crate::service::Service;

/// PullMessages operation
pub struct PullMessagesOperation;

/// Request for PullMessages operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullMessagesRequest {
    /// How long the device may hold the request open waiting for messages
    pub timeout: Duration,
    pub message_limit: u32,
}

impl Default for PullMessagesRequest {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            message_limit: 10,
        }
    }
}

/// One notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    /// e.g. `tns1:RuleEngine/CellMotionDetector/Motion`
    pub topic: Option<String>,
    pub utc_time: Option<DateTime<Utc>>,
    /// `SimpleItem` name/value pairs under `Source`
    pub source: Vec<(String, String)>,
    /// `SimpleItem` name/value pairs under `Data`
    pub data: Vec<(String, String)>,
}

/// Response for PullMessages operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullMessagesResponse {
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
    pub messages: Vec<NotificationMessage>,
}

impl OnvifOperation for PullMessagesOperation {
    type Request = PullMessagesRequest;
    type Response = PullMessagesResponse;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "PullMessages";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<Timeout>{}</Timeout><MessageLimit>{}</MessageLimit>",
            iso_seconds(request.timeout),
            request.message_limit
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let messages = find_all(xml, "NotificationMessage")
            .into_iter()
            .map(|notification| {
                let message = find_descendant(notification, "Message")
                    .and_then(|outer| child_elements(outer).find(|e| e.name == "Message"))
                    .or_else(|| find_descendant(notification, "Message"));

                NotificationMessage {
                    topic: find_text(notification, "Topic"),
                    utc_time: message
                        .and_then(|m| m.attributes.get("UtcTime"))
                        .and_then(|t| parse_instant(t)),
                    source: message.map(|m| simple_items(m, "Source")).unwrap_or_default(),
                    data: message.map(|m| simple_items(m, "Data")).unwrap_or_default(),
                }
            })
            .collect();

        Ok(PullMessagesResponse {
            current_time: find_text(xml, "CurrentTime").and_then(|t| parse_instant(&t)),
            termination_time: find_text(xml, "TerminationTime").and_then(|t| parse_instant(&t)),
            messages,
        })
    }
}

fn simple_items(message: &Element, section: &str) -> Vec<(String, String)> {
    let Some(section) = message.get_child(section) else {
        return Vec::new();
    };
    find_all(section, "SimpleItem")
        .into_iter()
        .filter_map(|item| {
            Some((
                item.attributes.get("Name")?.clone(),
                item.attributes.get("Value").cloned().unwrap_or_default(),
            ))
        })
        .collect()
}
