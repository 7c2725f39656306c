//! SOAP 1.2 envelope writer
//!
//! Envelopes are written through `quick_xml::Writer` so every interpolated
//! value (username, digest, addressing target) is escaped. The body fragment
//! is inserted verbatim; callers escape their own payload values with
//! [`escape`].

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use crate::error::SoapError;
use crate::wsse::UsernameToken;

pub const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const ONVIF_SCHEMA_NS: &str = "http://www.onvif.org/ver10/schema";
pub const WSNT_NS: &str = "http://docs.oasis-open.org/wsn/b-2";
pub const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_DIGEST_TYPE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const NONCE_ENCODING: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// Escape a value for use in element text or attribute content
pub fn escape(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}

/// Builder for one outbound envelope
#[derive(Debug, Default)]
pub struct Envelope<'a> {
    token: Option<&'a UsernameToken>,
    addressing: Option<(&'a str, &'a str)>,
    body: &'a str,
}

impl<'a> Envelope<'a> {
    pub fn new(body: &'a str) -> Self {
        Self {
            token: None,
            addressing: None,
            body,
        }
    }

    /// Attach a WS-Security header. Without it the header is omitted.
    pub fn with_security(mut self, token: Option<&'a UsernameToken>) -> Self {
        self.token = token;
        self
    }

    /// Attach WS-Addressing `Action` and `To` headers
    pub fn with_addressing(mut self, action: &'a str, to: &'a str) -> Self {
        self.addressing = Some((action, to));
        self
    }

    /// Serialize the envelope to a string
    pub fn to_xml(&self) -> Result<String, SoapError> {
        let mut writer = Writer::new(Vec::new());

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        writer
            .create_element("s:Envelope")
            .with_attribute(("xmlns:s", SOAP_ENV_NS))
            .with_attribute(("xmlns:tt", ONVIF_SCHEMA_NS))
            .with_attribute(("xmlns:wsnt", WSNT_NS))
            .with_attribute(("xmlns:wsa", WSA_NS))
            .write_inner_content(|w| {
                if self.token.is_some() || self.addressing.is_some() {
                    w.create_element("s:Header").write_inner_content(|w| {
                        if let Some((action, to)) = self.addressing {
                            w.create_element("wsa:Action")
                                .with_attribute(("s:mustUnderstand", "1"))
                                .write_text_content(BytesText::new(action))?;
                            w.create_element("wsa:To")
                                .with_attribute(("s:mustUnderstand", "1"))
                                .write_text_content(BytesText::new(to))?;
                        }
                        if let Some(token) = self.token {
                            write_security(w, token)?;
                        }
                        Ok::<(), quick_xml::Error>(())
                    })?;
                }

                w.create_element("s:Body").write_inner_content(|w| {
                    w.write_event(Event::Text(BytesText::from_escaped(self.body)))?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })
            .map_err(xml_error)?;

        String::from_utf8(writer.into_inner()).map_err(|e| SoapError::Xml(e.to_string()))
    }
}

fn write_security(
    w: &mut Writer<Vec<u8>>,
    token: &UsernameToken,
) -> quick_xml::Result<()> {
    w.create_element("wsse:Security")
        .with_attribute(("s:mustUnderstand", "1"))
        .with_attribute(("xmlns:wsse", WSSE_NS))
        .with_attribute(("xmlns:wsu", WSU_NS))
        .write_inner_content(|w| {
            w.create_element("wsse:UsernameToken")
                .write_inner_content(|w| {
                    w.create_element("wsse:Username")
                        .write_text_content(BytesText::new(&token.username))?;
                    w.create_element("wsse:Password")
                        .with_attribute(("Type", PASSWORD_DIGEST_TYPE))
                        .write_text_content(BytesText::new(&token.password_digest))?;
                    w.create_element("wsse:Nonce")
                        .with_attribute(("EncodingType", NONCE_ENCODING))
                        .write_text_content(BytesText::new(&token.nonce))?;
                    w.create_element("wsu:Created")
                        .write_text_content(BytesText::new(&token.created))?;
                    Ok::<(), quick_xml::Error>(())
                })?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(())
}

fn xml_error(err: quick_xml::Error) -> SoapError {
    SoapError::Xml(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wsse::Credentials;
    use chrono::Utc;

    #[test]
    fn test_envelope_without_credentials_has_no_header() {
        let xml = Envelope::new("<GetNodes/>").to_xml().unwrap();
        assert!(xml.contains("<s:Body><GetNodes/></s:Body>"));
        assert!(!xml.contains("s:Header"));
        assert!(!xml.contains("wsse:Security"));
    }

    #[test]
    fn test_envelope_with_security_header() {
        let token = UsernameToken::generate(&Credentials::new("admin", "secret"), Utc::now());
        let xml = Envelope::new("<GetNodes/>")
            .with_security(Some(&token))
            .to_xml()
            .unwrap();

        assert!(xml.contains("<wsse:Username>admin</wsse:Username>"));
        assert!(xml.contains(&token.password_digest));
        assert!(xml.contains(&token.nonce));
        assert!(xml.contains(&format!("<wsu:Created>{}</wsu:Created>", token.created)));
        assert!(xml.contains("#PasswordDigest"));
        assert!(!xml.contains("secret"));
    }

    #[test]
    fn test_username_is_escaped() {
        let token = UsernameToken::generate(&Credentials::new("a<b>&c", "pw"), Utc::now());
        let xml = Envelope::new("").with_security(Some(&token)).to_xml().unwrap();
        assert!(xml.contains("a&lt;b&gt;&amp;c"));
    }

    #[test]
    fn test_addressing_headers() {
        let xml = Envelope::new("<wsnt:Renew/>")
            .with_addressing("http://example/Renew", "http://cam/sub?id=1&x=2")
            .to_xml()
            .unwrap();
        assert!(xml.contains("<wsa:Action s:mustUnderstand=\"1\">http://example/Renew</wsa:Action>"));
        assert!(xml.contains("http://cam/sub?id=1&amp;x=2"));
    }

    #[test]
    fn test_escape_helper() {
        assert_eq!(escape("Front <Door> & 'Yard'"), "Front &lt;Door&gt; &amp; &apos;Yard&apos;");
    }
}
