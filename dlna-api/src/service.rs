/// The UPnP services of a media renderer this crate talks to
///
/// Each service provides a specific set of actions. Unlike fixed-layout
/// devices, DLNA renderers publish their control and event paths in the
/// device description, so only the identifiers live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// AVTransport service - Controls playback (play, pause, stop, load media)
    AVTransport,

    /// RenderingControl service - Controls audio rendering (volume, mute)
    RenderingControl,

    /// ConnectionManager service - Protocol and connection information
    ConnectionManager,
}

/// Static identifiers for a UPnP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// The service type URN used as the SOAP action namespace
    pub service_uri: &'static str,

    /// The `serviceId` advertised in the device description
    pub service_id: &'static str,
}

impl Service {
    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::AVTransport => "AVTransport",
            Service::RenderingControl => "RenderingControl",
            Service::ConnectionManager => "ConnectionManager",
        }
    }

    /// Get the service identifiers for this service
    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::AVTransport => ServiceInfo {
                service_uri: "urn:schemas-upnp-org:service:AVTransport:1",
                service_id: "urn:upnp-org:serviceId:AVTransport",
            },
            Service::RenderingControl => ServiceInfo {
                service_uri: "urn:schemas-upnp-org:service:RenderingControl:1",
                service_id: "urn:upnp-org:serviceId:RenderingControl",
            },
            Service::ConnectionManager => ServiceInfo {
                service_uri: "urn:schemas-upnp-org:service:ConnectionManager:1",
                service_id: "urn:upnp-org:serviceId:ConnectionManager",
            },
        }
    }

    /// Look up a service by the exact `serviceId` of a description entry
    pub fn from_service_id(service_id: &str) -> Option<Self> {
        [
            Service::AVTransport,
            Service::RenderingControl,
            Service::ConnectionManager,
        ]
        .into_iter()
        .find(|service| service.info().service_id == service_id)
    }
}
