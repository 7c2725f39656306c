//! Endpoint directory
//!
//! Devices expose their services on firmware-specific paths. The directory
//! asks the device once (capabilities first, the service listing as a
//! fallback), caches the answer for its own lifetime and falls back to the
//! conventional `/onvif/*_service` paths for anything the device did not
//! report.

use std::collections::HashMap;

use serde::Serialize;
use soap_client::{attribute_or_child, child_elements, Element};
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{ApiError, Result};
use crate::exchange::Exchange;
use crate::operation::OnvifOperation;
use crate::operations::device::{
    GetCapabilitiesOperation, GetCapabilitiesRequest, GetServicesOperation, GetServicesRequest,
};
use crate::reply::SoapReply;
use crate::service::Service;

/// A concrete service and the URL it answers on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub service: Service,
    pub url: String,
    /// True when the URL is the conventional path rather than one the device reported
    pub is_default: bool,
}

/// Per-device cache of service endpoints
///
/// Populated at most once; a failed discovery leaves the cache empty so a
/// later resolution can try again.
#[derive(Debug)]
pub struct EndpointDirectory {
    base: Url,
    endpoints: OnceCell<HashMap<Service, String>>,
}

impl EndpointDirectory {
    /// Create a directory for `host` (`192.168.1.10`, `cam:8080` or a full URL)
    pub fn new(host: &str) -> Result<Self> {
        Ok(Self {
            base: base_url(host)?,
            endpoints: OnceCell::new(),
        })
    }

    /// Create a directory with known endpoints; no discovery will be run
    pub fn with_endpoints(
        host: &str,
        endpoints: impl IntoIterator<Item = (Service, String)>,
    ) -> Result<Self> {
        let map = endpoints.into_iter().collect();
        Ok(Self {
            base: base_url(host)?,
            endpoints: OnceCell::new_with(Some(map)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Conventional URL for a service on this device
    pub fn default_url(&self, service: Service) -> String {
        let mut url = self.base.clone();
        url.set_path(service.default_path());
        url.to_string()
    }

    pub fn is_discovered(&self) -> bool {
        self.endpoints.initialized()
    }

    /// Resolve a logical service, discovering endpoints first if needed.
    ///
    /// `Media` resolves to `Media2` when known, then `Media1`, then the
    /// default media path.
    pub async fn resolve(&self, service: Service, exchange: &Exchange) -> Result<Endpoint> {
        let endpoints = self.discover(exchange).await?;
        Ok(self.pick(service, endpoints))
    }

    fn pick(&self, service: Service, endpoints: &HashMap<Service, String>) -> Endpoint {
        for candidate in service.candidates() {
            if let Some(url) = endpoints.get(candidate) {
                return Endpoint {
                    service: *candidate,
                    url: url.clone(),
                    is_default: false,
                };
            }
        }

        let fallback = service.fallback();
        Endpoint {
            service: fallback,
            url: self.default_url(fallback),
            is_default: true,
        }
    }

    /// Run discovery unless the cache is already populated
    pub async fn discover(&self, exchange: &Exchange) -> Result<&HashMap<Service, String>> {
        self.endpoints
            .get_or_try_init(|| self.run_discovery(exchange))
            .await
    }

    async fn run_discovery(&self, exchange: &Exchange) -> Result<HashMap<Service, String>> {
        let device_url = self.default_url(Service::Device);
        let mut found = HashMap::new();

        let capabilities =
            GetCapabilitiesOperation::request(&GetCapabilitiesRequest::default());
        let capabilities_fault = match exchange
            .call(&device_url, Service::Device, &capabilities, false)
            .await?
            .into_result()
        {
            Ok(reply) => {
                merge_from(&reply, &mut found);
                None
            }
            Err(e) if e.is_fault() => {
                tracing::warn!(error = %e, "capability listing failed, trying service listing");
                Some(e)
            }
            Err(e) => return Err(e),
        };

        if capabilities_fault.is_some() || !covers_core_services(&found) {
            let services = GetServicesOperation::request(&GetServicesRequest::default());
            match exchange
                .call(&device_url, Service::Device, &services, false)
                .await?
                .into_result()
            {
                Ok(reply) => merge_from(&reply, &mut found),
                Err(e) if e.is_fault() => match capabilities_fault {
                    Some(first) => {
                        return Err(ApiError::Discovery(format!(
                            "capability listing failed ({}); service listing failed ({})",
                            first, e
                        )))
                    }
                    None => tracing::debug!(error = %e, "service listing not supported"),
                },
                Err(e) => return Err(e),
            }
        }

        if found.is_empty() {
            tracing::warn!("device reported no service endpoints, using default paths");
        } else {
            tracing::info!(count = found.len(), "discovered service endpoints");
        }

        Ok(found)
    }

    /// Endpoints for every concrete service, discovered or default
    pub fn known_endpoints(&self) -> Vec<Endpoint> {
        let empty = HashMap::new();
        let endpoints = self.endpoints.get().unwrap_or(&empty);
        Service::CONCRETE
            .iter()
            .map(|service| self.pick(*service, endpoints))
            .collect()
    }
}

fn base_url(host: &str) -> Result<Url> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Configuration("device host is required".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|e| {
        ApiError::Configuration(format!("invalid device address '{}': {}", host, e))
    })?;
    if url.host_str().is_none() {
        return Err(ApiError::Configuration(format!(
            "invalid device address '{}': no host",
            host
        )));
    }

    url.set_path("");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn covers_core_services(found: &HashMap<Service, String>) -> bool {
    let has_media = found.contains_key(&Service::Media1) || found.contains_key(&Service::Media2);
    has_media && found.contains_key(&Service::Ptz) && found.contains_key(&Service::Events)
}

fn merge_from(reply: &SoapReply, found: &mut HashMap<Service, String>) {
    if let Some(body) = &reply.body {
        for (service, url) in parse_endpoints(body) {
            found.entry(service).or_insert(url);
        }
    }
}

/// Extract service endpoints from a capability or service listing.
///
/// Two shapes are recognised anywhere in the tree: a `Namespace`/`XAddr`
/// pair (child elements or attributes) and a per-category block such as
/// `<PTZ><XAddr>..</XAddr></PTZ>`. Pairs win over category blocks.
pub fn parse_endpoints(root: &Element) -> HashMap<Service, String> {
    let mut pairs = HashMap::new();
    let mut blocks = HashMap::new();
    walk(root, &mut pairs, &mut blocks);

    for (service, url) in blocks {
        pairs.entry(service).or_insert(url);
    }
    pairs
}

fn walk(
    element: &Element,
    pairs: &mut HashMap<Service, String>,
    blocks: &mut HashMap<Service, String>,
) {
    if let Some(xaddr) = attribute_or_child(element, "XAddr") {
        if let Some(service) =
            attribute_or_child(element, "Namespace").and_then(|ns| Service::from_namespace(&ns))
        {
            pairs.entry(service).or_insert(xaddr);
        } else if let Some(service) = Service::from_category(&element.name) {
            blocks.entry(service).or_insert(xaddr);
        }
    }

    for child in child_elements(element) {
        walk(child, pairs, blocks);
    }
}
