//! Scripted in-memory transport for tests
//!
//! Replies are matched by SOAP action name (the part after the last `/` of
//! the action URI), optionally narrowed to URLs containing a fragment. Each
//! route holds a queue; the last reply is sticky and repeats once the queue
//! is drained. Every call is recorded with its send instant.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use soap_client::{HttpReply, SoapError, Transport};
use tokio::time::Instant;

/// What a route answers with
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(HttpReply),
    Timeout,
    Refused,
}

/// Wrap a body fragment in a SOAP 1.2 envelope
pub fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Body>{}</env:Body></env:Envelope>"#,
        body
    )
}

/// 200 reply carrying `body` inside an envelope
pub fn ok(body: &str) -> Scripted {
    Scripted::Reply(HttpReply::new(200, envelope(body)))
}

/// Reply with an arbitrary status and raw body
pub fn status(code: u16, body: &str) -> Scripted {
    Scripted::Reply(HttpReply::new(code, body))
}

/// SOAP fault reply
pub fn fault(code: u16, subcode: &str, reason: &str) -> Scripted {
    Scripted::Reply(HttpReply::new(
        code,
        envelope(&format!(
            "<env:Fault><env:Code><env:Value>env:Sender</env:Value><env:Subcode><env:Value>{}</env:Value></env:Subcode></env:Code><env:Reason><env:Text xml:lang=\"en\">{}</env:Text></env:Reason></env:Fault>",
            subcode, reason
        )),
    ))
}

/// One recorded exchange
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    /// Action name, e.g. `GotoPreset`
    pub action: String,
    /// Full action URI from the content type
    pub soap_action: String,
    pub envelope: String,
    pub at: Instant,
}

#[derive(Debug)]
struct Route {
    action: String,
    url_fragment: Option<String>,
    replies: VecDeque<Scripted>,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `action` on any URL
    pub fn on(self, action: &str, reply: Scripted) -> Self {
        self.push(action, None, reply);
        self
    }

    /// Queue a reply for `action` on URLs containing `url_fragment`
    pub fn on_url(self, action: &str, url_fragment: &str, reply: Scripted) -> Self {
        self.push(action, Some(url_fragment.to_string()), reply);
        self
    }

    fn push(&self, action: &str, url_fragment: Option<String>, reply: Scripted) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes
            .iter_mut()
            .find(|r| r.action == action && r.url_fragment == url_fragment)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                action: action.to_string(),
                url_fragment,
                replies: VecDeque::from([reply]),
            }),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Action names in call order
    pub fn actions(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.action).collect()
    }

    pub fn count(&self, action: &str) -> usize {
        self.calls().iter().filter(|c| c.action == action).count()
    }

    fn next_reply(&self, url: &str, action: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());

        // URL-specific routes take precedence
        let index = routes
            .iter()
            .position(|r| {
                r.action == action
                    && r.url_fragment.as_deref().is_some_and(|f| url.contains(f))
            })
            .or_else(|| {
                routes
                    .iter()
                    .position(|r| r.action == action && r.url_fragment.is_none())
            })?;

        let route = &mut routes[index];
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(
        &self,
        url: &str,
        soap_action: &str,
        envelope: String,
    ) -> Result<HttpReply, SoapError> {
        let action = soap_action.rsplit('/').next().unwrap_or(soap_action).to_string();

        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                url: url.to_string(),
                action: action.clone(),
                soap_action: soap_action.to_string(),
                envelope,
                at: Instant::now(),
            });

        match self.next_reply(url, &action) {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Timeout) => Err(SoapError::Timeout(Duration::from_secs(10))),
            Some(Scripted::Refused) => Err(SoapError::Transport("connection refused".to_string())),
            None => Err(SoapError::Transport(format!("no scripted reply for {}", action))),
        }
    }
}
