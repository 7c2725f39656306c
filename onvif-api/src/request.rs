//! Outbound request description

use soap_client::{find_text, parse_document};

use crate::service::Service;

/// Body of a [`ServiceRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Complete body fragment, sent as-is
    Raw(String),
    /// Inner elements; wrapped in `<{Action} xmlns="...">` once the service is resolved
    Payload {
        inner: String,
        /// Overrides the resolved service namespace on the wrapper element
        namespace: Option<&'static str>,
    },
}

/// One SOAP exchange to perform against a logical service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub service: Service,
    pub action: String,
    pub body: RequestBody,
}

impl ServiceRequest {
    /// A request whose body is already a complete XML fragment
    pub fn raw(service: Service, action: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            service,
            action: action.into(),
            body: RequestBody::Raw(body.into()),
        }
    }

    /// A request whose inner elements are wrapped in the action element
    pub fn payload(service: Service, action: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            service,
            action: action.into(),
            body: RequestBody::Payload {
                inner: inner.into(),
                namespace: None,
            },
        }
    }

    /// Put the action element in a fixed namespace instead of the service's
    pub fn with_body_namespace(mut self, ns: Option<&'static str>) -> Self {
        if let RequestBody::Payload { namespace, .. } = &mut self.body {
            *namespace = ns;
        }
        self
    }

    /// SOAP action URI, `{namespace}/{Action}`, for the resolved service
    pub fn soap_action(&self, resolved: Service) -> String {
        format!("{}/{}", resolved.namespace(), self.action)
    }

    /// Body fragment for the resolved service
    pub fn render_body(&self, resolved: Service) -> String {
        match &self.body {
            RequestBody::Raw(xml) => xml.clone(),
            RequestBody::Payload { inner, namespace } => {
                let ns = namespace.unwrap_or_else(|| resolved.namespace());
                if inner.is_empty() {
                    format!("<{} xmlns=\"{}\"/>", self.action, ns)
                } else {
                    format!("<{0} xmlns=\"{1}\">{2}</{0}>", self.action, ns, inner)
                }
            }
        }
    }

    /// Text of the first element with the given local name inside the body
    pub fn find_value(&self, name: &str) -> Option<String> {
        let fragment = match &self.body {
            RequestBody::Raw(xml) => xml,
            RequestBody::Payload { inner, .. } => inner,
        };
        let root = parse_document(&format!("<Request>{}</Request>", fragment)).ok()?;
        find_text(&root, name)
    }
}
