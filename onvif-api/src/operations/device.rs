//! Device management operations

use serde::Serialize;
use soap_client::{attribute_or_child, find_all, find_text, Element};

use crate::directory::parse_endpoints;
use crate::error::Result;
use crate::operation::OnvifOperation;
use crate::service::Service;

/// GetCapabilities operation
pub struct GetCapabilitiesOperation;

/// Request for GetCapabilities operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCapabilitiesRequest {
    /// `All`, `Device`, `Media`, `PTZ`, `Events`, ...
    pub category: String,
}

impl Default for GetCapabilitiesRequest {
    fn default() -> Self {
        Self {
            category: "All".to_string(),
        }
    }
}

/// Response for GetCapabilities operation
#[derive(Debug, Clone, Serialize)]
pub struct GetCapabilitiesResponse {
    /// `(service, XAddr)` pairs, sorted by service
    pub endpoints: Vec<(Service, String)>,
}

impl OnvifOperation for GetCapabilitiesOperation {
    type Request = GetCapabilitiesRequest;
    type Response = GetCapabilitiesResponse;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetCapabilities";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<Category>{}</Category>",
            soap_client::escape(&request.category)
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let mut endpoints: Vec<_> = parse_endpoints(xml).into_iter().collect();
        endpoints.sort();
        Ok(GetCapabilitiesResponse { endpoints })
    }
}

/// GetServices operation
pub struct GetServicesOperation;

/// Request for GetServices operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetServicesRequest {
    pub include_capability: bool,
}

/// One entry of the service listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    pub namespace: String,
    pub xaddr: String,
    /// `major.minor`, when reported
    pub version: Option<String>,
}

/// Response for GetServices operation
#[derive(Debug, Clone, Serialize)]
pub struct GetServicesResponse {
    pub services: Vec<ServiceEntry>,
}

impl OnvifOperation for GetServicesOperation {
    type Request = GetServicesRequest;
    type Response = GetServicesResponse;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetServices";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<IncludeCapability>{}</IncludeCapability>",
            request.include_capability
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let services = find_all(xml, "Service")
            .into_iter()
            .filter_map(|svc| {
                let namespace = attribute_or_child(svc, "Namespace")?;
                let xaddr = attribute_or_child(svc, "XAddr")?;
                let version = svc.get_child("Version").and_then(|v| {
                    let major = find_text(v, "Major")?;
                    let minor = find_text(v, "Minor").unwrap_or_else(|| "0".to_string());
                    Some(format!("{}.{}", major, minor))
                });
                Some(ServiceEntry {
                    namespace,
                    xaddr,
                    version,
                })
            })
            .collect();

        Ok(GetServicesResponse { services })
    }
}

/// GetDeviceInformation operation
pub struct GetDeviceInformationOperation;

/// Response for GetDeviceInformation operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInformation {
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub hardware_id: String,
}

impl OnvifOperation for GetDeviceInformationOperation {
    type Request = ();
    type Response = DeviceInformation;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetDeviceInformation";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let text = |name| find_text(xml, name).unwrap_or_default();
        Ok(DeviceInformation {
            manufacturer: text("Manufacturer"),
            model: text("Model"),
            firmware_version: text("FirmwareVersion"),
            serial_number: text("SerialNumber"),
            hardware_id: text("HardwareId"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soap_client::parse_document;

    #[test]
    fn test_capabilities_payload() {
        let request = GetCapabilitiesOperation::request(&GetCapabilitiesRequest::default());
        assert_eq!(
            request.render_body(Service::Device),
            "<GetCapabilities xmlns=\"http://www.onvif.org/ver10/device/wsdl\"><Category>All</Category></GetCapabilities>"
        );
    }

    #[test]
    fn test_parse_services_with_versions() {
        let xml = parse_document(
            r#"<tds:GetServicesResponse xmlns:tds="x" xmlns:tt="y">
                <tds:Service>
                  <tds:Namespace>http://www.onvif.org/ver10/device/wsdl</tds:Namespace>
                  <tds:XAddr>http://h/onvif/device_service</tds:XAddr>
                  <tds:Version><tt:Major>2</tt:Major><tt:Minor>60</tt:Minor></tds:Version>
                </tds:Service>
                <tds:Service>
                  <tds:Namespace>http://www.onvif.org/ver20/ptz/wsdl</tds:Namespace>
                  <tds:XAddr>http://h/onvif/PTZ</tds:XAddr>
                </tds:Service>
              </tds:GetServicesResponse>"#,
        )
        .unwrap();

        let response = GetServicesOperation::parse_response(&xml).unwrap();
        assert_eq!(response.services.len(), 2);
        assert_eq!(response.services[0].version.as_deref(), Some("2.60"));
        assert_eq!(response.services[1].xaddr, "http://h/onvif/PTZ");
        assert_eq!(response.services[1].version, None);
    }

    #[test]
    fn test_parse_device_information() {
        let xml = parse_document(
            "<GetDeviceInformationResponse><Manufacturer>Acme</Manufacturer><Model>PTZ-9000</Model><FirmwareVersion>1.2.3</FirmwareVersion><SerialNumber>SN1</SerialNumber></GetDeviceInformationResponse>",
        )
        .unwrap();
        let info = GetDeviceInformationOperation::parse_response(&xml).unwrap();
        assert_eq!(info.manufacturer, "Acme");
        assert_eq!(info.model, "PTZ-9000");
        assert_eq!(info.firmware_version, "1.2.3");
        assert_eq!(info.serial_number, "SN1");
        assert_eq!(info.hardware_id, "");
    }
}
