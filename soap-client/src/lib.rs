//! SOAP 1.2 client plumbing for ONVIF devices
//!
//! This crate covers the wire level only: writing envelopes with an optional
//! WS-Security UsernameToken, posting them over HTTP with a bounded timeout,
//! and reading the body or fault back out of the response. It knows nothing
//! about ONVIF services or endpoints.

mod envelope;
mod error;
mod response;
mod transport;
mod wsse;

pub use envelope::{escape, Envelope, ONVIF_SCHEMA_NS, SOAP_ENV_NS, WSA_NS, WSNT_NS};
pub use error::SoapError;
pub use response::{
    attribute_or_child, child_elements, find_all, find_descendant, find_text, flatten_fields,
    parse_document, read_body, strip_namespaces, text_of, SoapBody, SoapFault,
};
pub use transport::{content_type, HttpReply, SoapClient, Transport, DEFAULT_TIMEOUT};
pub use wsse::{compute_digest, Credentials, UsernameToken, NONCE_LEN};

/// Re-exported so callers can walk parsed bodies without a direct dependency
pub use xmltree::Element;
