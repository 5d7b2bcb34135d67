//! Device description parsing
//!
//! Extracts the service URLs a control point needs from a renderer's UPnP
//! device description. Only the AVTransport service is mandatory; the
//! RenderingControl and ConnectionManager URLs are optional.

use serde::Deserialize;
use url::Url;

use crate::error::{ApiError, Result};
use crate::service::Service;

/// UPnP device description root element
#[derive(Debug, Deserialize)]
struct Root {
    #[serde(rename = "URLBase", default)]
    url_base: Option<String>,
    device: DescribedDevice,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribedDevice {
    #[serde(default)]
    device_type: String,
    #[serde(default)]
    friendly_name: String,
    #[serde(default)]
    service_list: Option<ServiceList>,
    #[serde(default)]
    device_list: Option<DeviceList>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceList {
    #[serde(rename = "service", default)]
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceList {
    #[serde(rename = "device", default)]
    devices: Vec<DescribedDevice>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceEntry {
    #[serde(rename = "serviceId", default)]
    service_id: String,
    #[serde(rename = "controlURL", default)]
    control_url: String,
    #[serde(rename = "eventSubURL", default)]
    event_sub_url: String,
}

/// Absolute service URLs of one renderer
///
/// Extracted once per renderer and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// `friendlyName` of the device that carries the AVTransport service
    pub friendly_name: String,
    /// `deviceType` of that device
    pub device_type: String,
    pub av_transport_control_url: String,
    pub av_transport_event_url: String,
    /// `None` when the renderer has no RenderingControl service
    pub rendering_control_url: Option<String>,
    /// `None` when the renderer has no ConnectionManager service
    pub connection_manager_url: Option<String>,
}

impl DeviceCapabilities {
    /// Parse a device description fetched from `base_url`
    ///
    /// Relative service paths are resolved against the scheme and host of
    /// `<URLBase>` when present, otherwise of `base_url`. A missing leading
    /// `/` is added first. Absolute service URLs are kept as-is.
    ///
    /// # Errors
    /// * `ApiError::ParseError` for malformed XML or an unusable base URL
    /// * `ApiError::IncompatibleDevice` when no AVTransport service exists
    pub fn from_description(xml: &str, base_url: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml).map_err(|e| {
            ApiError::ParseError(format!("Failed to parse device description: {}", e))
        })?;

        let base = match root.url_base.as_deref().map(str::trim) {
            Some(url_base) if !url_base.is_empty() => url_base,
            _ => base_url,
        };
        let origin = origin_of(base)?;

        let mut found = Found::default();
        collect_services(&root.device, &mut found);

        let (device, av_transport) = found.av_transport.ok_or_else(|| {
            ApiError::IncompatibleDevice(format!(
                "no {} service in device description",
                Service::AVTransport.info().service_id
            ))
        })?;

        Ok(Self {
            friendly_name: device.friendly_name.trim().to_string(),
            device_type: device.device_type.trim().to_string(),
            av_transport_control_url: resolve_service_url(&origin, &av_transport.control_url),
            av_transport_event_url: resolve_service_url(&origin, &av_transport.event_sub_url),
            rendering_control_url: found
                .rendering_control
                .map(|entry| resolve_service_url(&origin, &entry.control_url)),
            connection_manager_url: found
                .connection_manager
                .map(|entry| resolve_service_url(&origin, &entry.control_url)),
        })
    }

    /// Whether mute and volume actions can be sent to this renderer
    pub fn supports_rendering_control(&self) -> bool {
        self.rendering_control_url.is_some()
    }
}

#[derive(Default)]
struct Found<'a> {
    av_transport: Option<(&'a DescribedDevice, &'a ServiceEntry)>,
    rendering_control: Option<&'a ServiceEntry>,
    connection_manager: Option<&'a ServiceEntry>,
}

/// Depth-first walk over the device tree; the first entry per service wins
fn collect_services<'a>(device: &'a DescribedDevice, found: &mut Found<'a>) {
    let services = device
        .service_list
        .as_ref()
        .map(|list| list.services.as_slice())
        .unwrap_or_default();

    for entry in services {
        match Service::from_service_id(entry.service_id.trim()) {
            Some(Service::AVTransport) if found.av_transport.is_none() => {
                found.av_transport = Some((device, entry));
            }
            Some(Service::RenderingControl) if found.rendering_control.is_none() => {
                found.rendering_control = Some(entry);
            }
            Some(Service::ConnectionManager) if found.connection_manager.is_none() => {
                found.connection_manager = Some(entry);
            }
            _ => {}
        }
    }

    if let Some(list) = &device.device_list {
        for child in &list.devices {
            collect_services(child, found);
        }
    }
}

/// `scheme://host[:port]` of a URL
fn origin_of(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::ParseError(format!("Invalid base URL '{}': {}", base_url, e)))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(ApiError::ParseError(format!(
            "Base URL '{}' has no host",
            base_url
        )));
    }
    Ok(origin.ascii_serialization())
}

/// Join a service path onto an origin
///
/// `origin` is `scheme://host[:port]`; `path` gets a leading `/` when it has
/// none. Absolute `http(s)` URLs are returned unchanged.
pub fn resolve_service_url(origin: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}
