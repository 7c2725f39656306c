use std::fmt;

use serde::Serialize;

/// The ONVIF services a device may expose
///
/// `Media` is the logical media service; it resolves to `Media2` when the
/// device offers it and to `Media1` otherwise. Every other variant names a
/// concrete service with a fixed namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Service {
    /// Device management, capability and service listing
    Device,
    /// Logical media service (either version)
    Media,
    /// Media service, ver10
    Media1,
    /// Media service, ver20
    Media2,
    /// Pan/tilt/zoom control, ver20
    Ptz,
    /// Event subscriptions, ver10
    Events,
}

impl Service {
    /// All concrete services, in display order
    pub const CONCRETE: [Service; 5] = [
        Service::Device,
        Service::Media1,
        Service::Media2,
        Service::Ptz,
        Service::Events,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Device => "Device",
            Service::Media => "Media",
            Service::Media1 => "Media1",
            Service::Media2 => "Media2",
            Service::Ptz => "PTZ",
            Service::Events => "Events",
        }
    }

    /// WSDL namespace used for the body element and the SOAP action URI.
    ///
    /// The logical `Media` service reports the ver10 namespace; callers
    /// normally use the namespace of the resolved concrete service.
    pub fn namespace(&self) -> &'static str {
        match self {
            Service::Device => "http://www.onvif.org/ver10/device/wsdl",
            Service::Media | Service::Media1 => "http://www.onvif.org/ver10/media/wsdl",
            Service::Media2 => "http://www.onvif.org/ver20/media/wsdl",
            Service::Ptz => "http://www.onvif.org/ver20/ptz/wsdl",
            Service::Events => "http://www.onvif.org/ver10/events/wsdl",
        }
    }

    /// Conventional path used when discovery did not report the service
    pub fn default_path(&self) -> &'static str {
        match self {
            Service::Device => "/onvif/device_service",
            Service::Media | Service::Media1 | Service::Media2 => "/onvif/media_service",
            Service::Ptz => "/onvif/ptz_service",
            Service::Events => "/onvif/event_service",
        }
    }

    /// Concrete services that can answer for this one, most preferred first
    pub fn candidates(&self) -> &'static [Service] {
        match self {
            Service::Device => &[Service::Device],
            Service::Media => &[Service::Media2, Service::Media1],
            Service::Media1 => &[Service::Media1],
            Service::Media2 => &[Service::Media2],
            Service::Ptz => &[Service::Ptz],
            Service::Events => &[Service::Events],
        }
    }

    /// Service used when no candidate was discovered
    pub fn fallback(&self) -> Service {
        match self {
            Service::Media => Service::Media1,
            other => *other,
        }
    }

    /// Map a WSDL namespace string to its concrete service
    pub fn from_namespace(namespace: &str) -> Option<Service> {
        let ns = namespace.trim().trim_end_matches('/');
        if ns.ends_with("ver10/device/wsdl") {
            Some(Service::Device)
        } else if ns.ends_with("ver10/media/wsdl") {
            Some(Service::Media1)
        } else if ns.ends_with("ver20/media/wsdl") {
            Some(Service::Media2)
        } else if ns.ends_with("ver20/ptz/wsdl") {
            Some(Service::Ptz)
        } else if ns.ends_with("ver10/events/wsdl") {
            Some(Service::Events)
        } else {
            None
        }
    }

    /// Map a capability block name (`Device`, `Media`, `PTZ`, ...) to its service
    pub fn from_category(name: &str) -> Option<Service> {
        match name {
            "Device" => Some(Service::Device),
            "Media" => Some(Service::Media1),
            "Media2" => Some(Service::Media2),
            "PTZ" => Some(Service::Ptz),
            "Events" => Some(Service::Events),
            _ => None,
        }
    }

    /// PTZ-class requests are the only ones eligible for the wakeup chain
    pub fn is_ptz(&self) -> bool {
        matches!(self, Service::Ptz)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
