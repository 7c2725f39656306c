//! Parsed response to one exchange

use soap_client::{find_text, flatten_fields, read_body, Element, HttpReply, SoapBody, SoapFault};

use crate::error::{ApiError, Result};

const MISSING_TOKEN_PATTERNS: [&str; 3] = ["notoken", "no such token", "token does not exist"];

/// Response to a SOAP exchange
///
/// Parsing is best effort: a body that cannot be read leaves `body` empty and
/// `fields` without entries, but `raw` always holds what the device sent.
#[derive(Debug, Clone)]
pub struct SoapReply {
    pub action: String,
    pub status: u16,
    pub raw: String,
    /// First element child of the SOAP body, namespace prefixes removed
    pub body: Option<Element>,
    pub fault: Option<SoapFault>,
    /// Dotted-path key/value pairs flattened from `body`
    pub fields: Vec<(String, String)>,
}

impl SoapReply {
    pub fn from_http(action: &str, reply: HttpReply) -> Self {
        let mut parsed = Self {
            action: action.to_string(),
            status: reply.status,
            raw: String::new(),
            body: None,
            fault: None,
            fields: Vec::new(),
        };

        match read_body(&reply.body) {
            Ok(SoapBody::Response(element)) => {
                parsed.fields = flatten_fields(&element);
                parsed.body = Some(element);
            }
            Ok(SoapBody::Fault(fault)) => parsed.fault = Some(fault),
            Ok(SoapBody::Empty) => {}
            Err(e) => {
                tracing::debug!(action, status = reply.status, error = %e, "unreadable response body");
            }
        }

        parsed.raw = reply.body;
        parsed
    }

    pub fn is_success(&self) -> bool {
        self.fault.is_none() && (200..300).contains(&self.status)
    }

    /// First field with the given key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Text of the first body element with the given local name
    pub fn find_text(&self, name: &str) -> Option<String> {
        self.body.as_ref().and_then(|body| find_text(body, name))
    }

    /// Whether the device complained about an unknown token
    pub fn matches_missing_token(&self) -> bool {
        let mut haystack = self.raw.to_lowercase();
        if let Some(fault) = &self.fault {
            haystack.push(' ');
            haystack.push_str(&fault.reason.to_lowercase());
            if let Some(subcode) = &fault.subcode {
                haystack.push(' ');
                haystack.push_str(&subcode.to_lowercase());
            }
        }
        MISSING_TOKEN_PATTERNS.iter().any(|p| haystack.contains(p))
    }

    /// Turn faults and non-success statuses into [`ApiError::Fault`]
    pub fn into_result(self) -> Result<SoapReply> {
        if self.is_success() {
            return Ok(self);
        }

        let (code, reason) = match &self.fault {
            Some(fault) => (
                fault.subcode.clone().unwrap_or_else(|| fault.code.clone()),
                if fault.reason.is_empty() {
                    format!("HTTP {}", self.status)
                } else {
                    fault.reason.clone()
                },
            ),
            None => (String::new(), format!("unexpected HTTP status {}", self.status)),
        };

        Err(ApiError::Fault {
            action: self.action,
            status: self.status,
            code,
            reason,
        })
    }

    /// Body element, or a protocol error naming the action
    pub fn require_body(&self) -> Result<&Element> {
        self.body
            .as_ref()
            .ok_or_else(|| ApiError::Protocol(format!("{} returned no response element", self.action)))
    }
}
