use xmltree::Element;

use crate::error::Result;
use crate::service::Service;

/// Fixed `InstanceID` used by every AVTransport and RenderingControl action
pub const INSTANCE_ID: &str = "0";

/// Fixed playback speed sent with `Play`
pub const PLAY_SPEED: &str = "1";

/// Fixed RenderingControl channel
pub const MASTER_CHANNEL: &str = "Master";

/// Base trait for all UPnP actions sent to a media renderer
///
/// An operation is stateless: it knows its service and action name, how to
/// serialize a request into the complete envelope bytes and how to read the
/// `<{Action}Response>` element back.
pub trait UpnpOperation {
    /// The request type for this operation
    type Request;

    /// The response type for this operation
    type Response;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Serialize the request into the exact envelope bytes sent on the wire
    fn build_envelope(request: &Self::Request) -> Result<Vec<u8>>;

    /// Parse the `<{Action}Response>` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response>;
}

/// An in-flight SOAP request: target, action and serialized body
///
/// Created per call and dropped after the HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub url: String,
    pub service_uri: &'static str,
    pub action: &'static str,
    pub body: Vec<u8>,
}

impl PendingAction {
    pub fn new<Op: UpnpOperation>(control_url: &str, request: &Op::Request) -> Result<Self> {
        Ok(Self {
            url: control_url.to_string(),
            service_uri: Op::SERVICE.info().service_uri,
            action: Op::ACTION,
            body: Op::build_envelope(request)?,
        })
    }
}

/// Text of a direct child element, trimmed; `None` when absent
pub(crate) fn child_text(xml: &Element, name: &str) -> Option<String> {
    xml.get_child(name)
        .and_then(|child| child.get_text())
        .map(|text| text.trim().to_string())
}
