//! SetAVTransportURI operation for AVTransport service

use xmltree::Element;

use crate::didl::DidlItem;
use crate::envelope::SoapEnvelopeBuilder;
use crate::operation::INSTANCE_ID;
use crate::{Result, Service, UpnpOperation};

/// SetAVTransportURI operation
///
/// Loads a media item into the renderer. The item is described by an
/// embedded DIDL-Lite document carried as escaped text in
/// `CurrentURIMetaData`, and the serialized envelope goes through the
/// renderer fixups (`&#34;` and `&amp;` are unescaped).
pub struct SetAVTransportURIOperation;

/// Request for SetAVTransportURI operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAVTransportURIRequest {
    pub media_url: String,
    pub media_type: String,
    pub subtitle_url: String,
}

impl SetAVTransportURIRequest {
    pub fn new(
        media_url: impl Into<String>,
        media_type: impl Into<String>,
        subtitle_url: impl Into<String>,
    ) -> Self {
        Self {
            media_url: media_url.into(),
            media_type: media_type.into(),
            subtitle_url: subtitle_url.into(),
        }
    }
}

impl UpnpOperation for SetAVTransportURIOperation {
    type Request = SetAVTransportURIRequest;
    type Response = ();

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "SetAVTransportURI";

    fn build_envelope(request: &Self::Request) -> Result<Vec<u8>> {
        let metadata = DidlItem::new(
            request.media_url.as_str(),
            request.media_type.as_str(),
            request.subtitle_url.as_str(),
        )
        .to_xml()?;

        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .argument("CurrentURI", request.media_url.as_str())
            .argument("CurrentURIMetaData", metadata)
            .with_renderer_fixups()
            .build()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(())
    }
}
