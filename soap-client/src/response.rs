//! Structural reading of SOAP responses
//!
//! Devices disagree on namespace prefixes and sometimes use prefixes they never
//! declare. Documents are therefore stripped of prefixes and `xmlns`
//! declarations before being handed to `xmltree`, and all lookups go by local
//! name.

use xmltree::{Element, XMLNode};

use crate::error::SoapError;

/// Fault details reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    /// `Code/Value`, e.g. `s:Sender`
    pub code: String,
    /// Innermost `Subcode/Value`, e.g. `ter:NoToken`
    pub subcode: Option<String>,
    /// `Reason/Text` (or SOAP 1.1 `faultstring`)
    pub reason: String,
}

/// What the SOAP body contained
#[derive(Debug, Clone)]
pub enum SoapBody {
    /// First element child of `Body`
    Response(Element),
    /// A `Fault` element
    Fault(SoapFault),
    /// `Body` present but without element children
    Empty,
}

/// Remove namespace prefixes and `xmlns` declarations from a document.
///
/// `<tds:XAddr>` and `<XAddr>` both become `<XAddr>`; `xsi:type="x"` becomes
/// `type="x"`. Processing instructions, comments and CDATA are copied as-is.
pub fn strip_namespaces(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut chars = xml.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }
        out.push(c);

        if let Some(&next) = chars.peek() {
            if next == '?' || next == '!' {
                for ch in chars.by_ref() {
                    out.push(ch);
                    if ch == '>' {
                        break;
                    }
                }
                continue;
            }
            if next == '/' {
                out.push(next);
                chars.next();
            }
        }

        let mut tag = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() || ch == '>' || ch == '/' {
                break;
            }
            tag.push(ch);
            chars.next();
        }
        out.push_str(local_part(&tag));

        // attributes up to the end of the tag; whitespace is held back so
        // dropped declarations leave no gap
        let mut pending = String::new();
        loop {
            let Some(&ch) = chars.peek() else { break };
            if ch.is_whitespace() {
                pending.push(ch);
                chars.next();
                continue;
            }
            if ch == '>' || ch == '/' {
                out.push_str(&pending);
                pending.clear();
                out.push(ch);
                chars.next();
                if ch == '>' {
                    break;
                }
                continue;
            }

            let mut name = String::new();
            while let Some(&ach) = chars.peek() {
                if ach == '=' || ach.is_whitespace() || ach == '>' || ach == '/' {
                    break;
                }
                name.push(ach);
                chars.next();
            }

            let keep = !(name == "xmlns" || name.starts_with("xmlns:"));
            if keep {
                out.push_str(&pending);
                out.push_str(local_part(&name));
            }
            pending.clear();

            // optional `= "value"`
            while let Some(&ach) = chars.peek() {
                if ach == '=' || ach.is_whitespace() {
                    if keep {
                        out.push(ach);
                    }
                    chars.next();
                    continue;
                }
                if ach == '"' || ach == '\'' {
                    chars.next();
                    if keep {
                        out.push(ach);
                    }
                    for vch in chars.by_ref() {
                        if keep {
                            out.push(vch);
                        }
                        if vch == ach {
                            break;
                        }
                    }
                }
                break;
            }
        }
    }

    out
}

fn local_part(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Parse a document after namespace stripping
pub fn parse_document(xml: &str) -> Result<Element, SoapError> {
    let stripped = strip_namespaces(xml);
    Element::parse(stripped.as_bytes()).map_err(|e| SoapError::Xml(e.to_string()))
}

/// Read the body of a SOAP envelope
pub fn read_body(xml: &str) -> Result<SoapBody, SoapError> {
    let envelope = parse_document(xml)?;
    let body = if envelope.name == "Body" {
        &envelope
    } else {
        find_descendant(&envelope, "Body")
            .ok_or_else(|| SoapError::Xml("Missing SOAP Body".to_string()))?
    };

    if let Some(fault) = body.get_child("Fault") {
        return Ok(SoapBody::Fault(read_fault(fault)));
    }

    let out = match child_elements(body).next() {
        Some(first) => SoapBody::Response(first.clone()),
        None => SoapBody::Empty,
    };
    Ok(out)
}

fn read_fault(fault: &Element) -> SoapFault {
    let code = fault
        .get_child("Code")
        .and_then(|c| c.get_child("Value"))
        .and_then(text_of)
        .or_else(|| fault.get_child("faultcode").and_then(text_of))
        .unwrap_or_default();

    // walk nested Subcode elements down to the most specific one
    let mut subcode = None;
    let mut cursor = fault.get_child("Code").and_then(|c| c.get_child("Subcode"));
    while let Some(sc) = cursor {
        if let Some(value) = sc.get_child("Value").and_then(text_of) {
            subcode = Some(value);
        }
        cursor = sc.get_child("Subcode");
    }

    let reason = fault
        .get_child("Reason")
        .and_then(|r| r.get_child("Text"))
        .and_then(text_of)
        .or_else(|| fault.get_child("faultstring").and_then(text_of))
        .unwrap_or_default();

    SoapFault {
        code,
        subcode,
        reason,
    }
}

/// Iterate over element children
pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(e) => Some(e),
        _ => None,
    })
}

/// Trimmed, non-empty text content of an element
pub fn text_of(element: &Element) -> Option<String> {
    element
        .get_text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Depth-first search for the first element with the given local name,
/// including `element` itself
pub fn find_descendant<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    if element.name == name {
        return Some(element);
    }
    child_elements(element).find_map(|child| find_descendant(child, name))
}

/// All elements with the given local name, in document order
pub fn find_all<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_named(element, name, &mut found);
    found
}

fn collect_named<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    if element.name == name {
        found.push(element);
    }
    for child in child_elements(element) {
        collect_named(child, name, found);
    }
}

/// Text of the first descendant with the given local name
pub fn find_text(element: &Element, name: &str) -> Option<String> {
    find_descendant(element, name).and_then(text_of)
}

/// Value carried either as an attribute or as a child element's text
pub fn attribute_or_child(element: &Element, name: &str) -> Option<String> {
    element
        .attributes
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| element.get_child(name).and_then(text_of))
}

/// Flatten an element into dotted-path key/value pairs.
///
/// Leaf text becomes `Parent.Child = text`; attributes become
/// `Parent.Child@attr = value`. Paths are relative to `element`.
pub fn flatten_fields(element: &Element) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    for (key, value) in &element.attributes {
        fields.push((format!("@{}", key), value.clone()));
    }
    for child in child_elements(element) {
        flatten_into(child, child.name.clone(), &mut fields);
    }
    fields
}

fn flatten_into(element: &Element, path: String, fields: &mut Vec<(String, String)>) {
    let mut attributes: Vec<_> = element.attributes.iter().collect();
    attributes.sort();
    for (key, value) in attributes {
        fields.push((format!("{}@{}", path, key), value.clone()));
    }

    let mut has_children = false;
    for child in child_elements(element) {
        has_children = true;
        flatten_into(child, format!("{}.{}", path, child.name), fields);
    }

    if !has_children {
        if let Some(text) = text_of(element) {
            fields.push((path, text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope" xmlns:tds="http://www.onvif.org/ver10/device/wsdl">
  <SOAP-ENV:Body>
    <tds:GetDeviceInformationResponse>
      <tds:Manufacturer>Acme</tds:Manufacturer>
      <tds:Model>PTZ-9000</tds:Model>
      <tds:FirmwareVersion>1.2.3</tds:FirmwareVersion>
    </tds:GetDeviceInformationResponse>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    #[test]
    fn test_strip_namespaces() {
        let stripped = strip_namespaces(
            r#"<s:Envelope xmlns:s="urn:x"><s:Body><tt:Preset token="1" xsi:type="a"><tt:Name>Gate</tt:Name></tt:Preset></s:Body></s:Envelope>"#,
        );
        assert_eq!(
            stripped,
            r#"<Envelope><Body><Preset token="1" type="a"><Name>Gate</Name></Preset></Body></Envelope>"#
        );
    }

    #[test]
    fn test_strip_keeps_declaration_and_self_closing() {
        let stripped = strip_namespaces(r#"<?xml version="1.0"?><a:Root><a:Empty/><b:Leaf x='1' /></a:Root>"#);
        assert_eq!(stripped, r#"<?xml version="1.0"?><Root><Empty/><Leaf x='1' /></Root>"#);
    }

    #[test]
    fn test_undeclared_prefixes_still_parse() {
        let xml = "<env:Envelope><env:Body><tds:Foo><tds:Bar>1</tds:Bar></tds:Foo></env:Body></env:Envelope>";
        match read_body(xml).unwrap() {
            SoapBody::Response(el) => assert_eq!(find_text(&el, "Bar").as_deref(), Some("1")),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_read_body_response_and_flatten() {
        let body = read_body(DEVICE_INFO).unwrap();
        let SoapBody::Response(el) = body else {
            panic!("expected response");
        };
        assert_eq!(el.name, "GetDeviceInformationResponse");

        let fields = flatten_fields(&el);
        assert_eq!(
            fields,
            vec![
                ("Manufacturer".to_string(), "Acme".to_string()),
                ("Model".to_string(), "PTZ-9000".to_string()),
                ("FirmwareVersion".to_string(), "1.2.3".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_nested_and_attributes() {
        let el = parse_document(
            r#"<R><Preset token="p1"><Name>Gate</Name><Position><PanTilt x="0.5" y="-0.1"/></Position></Preset></R>"#,
        )
        .unwrap();
        let fields = flatten_fields(&el);
        assert!(fields.contains(&("Preset@token".to_string(), "p1".to_string())));
        assert!(fields.contains(&("Preset.Name".to_string(), "Gate".to_string())));
        assert!(fields.contains(&("Preset.Position.PanTilt@x".to_string(), "0.5".to_string())));
        assert!(fields.contains(&("Preset.Position.PanTilt@y".to_string(), "-0.1".to_string())));
    }

    #[test]
    fn test_read_soap12_fault() {
        let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:ter="http://www.onvif.org/ver10/error">
  <s:Body><s:Fault>
    <s:Code><s:Value>s:Sender</s:Value>
      <s:Subcode><s:Value>ter:InvalidArgVal</s:Value>
        <s:Subcode><s:Value>ter:NoToken</s:Value></s:Subcode>
      </s:Subcode>
    </s:Code>
    <s:Reason><s:Text xml:lang="en">The requested preset token does not exist</s:Text></s:Reason>
  </s:Fault></s:Body>
</s:Envelope>"#;

        let SoapBody::Fault(fault) = read_body(xml).unwrap() else {
            panic!("expected fault");
        };
        assert_eq!(fault.code, "s:Sender");
        assert_eq!(fault.subcode.as_deref(), Some("ter:NoToken"));
        assert_eq!(fault.reason, "The requested preset token does not exist");
    }

    #[test]
    fn test_read_soap11_fault() {
        let xml = r#"<Envelope><Body><Fault><faultcode>Client</faultcode><faultstring>Bad</faultstring></Fault></Body></Envelope>"#;
        let SoapBody::Fault(fault) = read_body(xml).unwrap() else {
            panic!("expected fault");
        };
        assert_eq!(fault.code, "Client");
        assert_eq!(fault.reason, "Bad");
        assert_eq!(fault.subcode, None);
    }

    #[test]
    fn test_empty_body() {
        let xml = r#"<s:Envelope xmlns:s="urn:x"><s:Body/></s:Envelope>"#;
        assert!(matches!(read_body(xml).unwrap(), SoapBody::Empty));
    }

    #[test]
    fn test_missing_body_is_error() {
        let xml = r#"<s:Envelope xmlns:s="urn:x"><s:Header/></s:Envelope>"#;
        assert!(read_body(xml).is_err());
        assert!(read_body("not xml at all <").is_err());
    }

    #[test]
    fn test_attribute_or_child() {
        let el = parse_document(r#"<Svc XAddr="http://a/1"><Namespace>urn:n</Namespace></Svc>"#).unwrap();
        assert_eq!(attribute_or_child(&el, "XAddr").as_deref(), Some("http://a/1"));
        assert_eq!(attribute_or_child(&el, "Namespace").as_deref(), Some("urn:n"));
        assert_eq!(attribute_or_child(&el, "Missing"), None);
    }
}
