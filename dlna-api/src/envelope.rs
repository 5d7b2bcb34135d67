//! SOAP envelope serialization for UPnP actions
//!
//! Every envelope is emitted with the literal declaration
//! `<?xml version='1.0' encoding='utf-8'?>` and no trailing newline. Argument
//! values are written with only `<`, `>` and `&` escaped, so quotes embedded in
//! metadata documents reach the renderer verbatim.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{marshal_error, Result};
use crate::service::Service;

/// Declaration prefixed to every envelope
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Builder for the exact byte sequence of one UPnP SOAP action
///
/// ```rust
/// use dlna_api::{Service, SoapEnvelopeBuilder};
///
/// let body = SoapEnvelopeBuilder::new(Service::RenderingControl, "GetVolume")
///     .argument("InstanceID", "0")
///     .argument("Channel", "Master")
///     .build()
///     .unwrap();
/// assert!(body.starts_with(b"<?xml version='1.0' encoding='utf-8'?><s:Envelope"));
/// ```
#[derive(Debug, Clone)]
pub struct SoapEnvelopeBuilder {
    service: Service,
    action: &'static str,
    arguments: Vec<(&'static str, String)>,
    renderer_fixups: bool,
}

impl SoapEnvelopeBuilder {
    pub fn new(service: Service, action: &'static str) -> Self {
        Self {
            service,
            action,
            arguments: Vec::new(),
            renderer_fixups: false,
        }
    }

    /// Append an action argument; order is preserved on the wire
    pub fn argument(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.arguments.push((name, value.into()));
        self
    }

    /// Apply [`apply_renderer_fixups`] to the serialized envelope
    pub fn with_renderer_fixups(mut self) -> Self {
        self.renderer_fixups = true;
        self
    }

    /// Serialize the envelope
    ///
    /// # Errors
    /// Returns `ApiError::MarshalError` if the writer fails. The error is final
    /// for the action being built.
    pub fn build(&self) -> Result<Vec<u8>> {
        let service_uri = self.service.info().service_uri;
        let action_tag = format!("u:{}", self.action);
        let mut writer = Writer::new(Vec::new());

        let envelope = BytesStart::new("s:Envelope").with_attributes([
            ("xmlns:s", SOAP_ENVELOPE_NS),
            ("s:encodingStyle", SOAP_ENCODING_STYLE),
        ]);
        writer
            .write_event(Event::Start(envelope))
            .map_err(marshal_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("s:Body")))
            .map_err(marshal_error)?;
        writer
            .write_event(Event::Start(
                BytesStart::new(action_tag.as_str()).with_attributes([("xmlns:u", service_uri)]),
            ))
            .map_err(marshal_error)?;

        for (name, value) in &self.arguments {
            writer
                .write_event(Event::Start(BytesStart::new(*name)))
                .map_err(marshal_error)?;
            writer
                .write_event(Event::Text(BytesText::from_escaped(partial_escape(value))))
                .map_err(marshal_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(*name)))
                .map_err(marshal_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(action_tag.as_str())))
            .map_err(marshal_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("s:Body")))
            .map_err(marshal_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("s:Envelope")))
            .map_err(marshal_error)?;

        let body = writer.into_inner();
        let mut envelope = Vec::with_capacity(XML_DECLARATION.len() + body.len());
        envelope.extend_from_slice(XML_DECLARATION.as_bytes());
        envelope.extend_from_slice(&body);

        if self.renderer_fixups {
            apply_renderer_fixups(envelope)
        } else {
            Ok(envelope)
        }
    }
}

/// Post-marshal substitutions required by common renderers
///
/// Replaces every `&#34;` with `"`, then every `&amp;` with `&`, each in a
/// single left-to-right pass over the serialized envelope.
///
/// URLs with a query string do not survive this. A `&` in `CurrentURI`
/// comes out bare, so the envelope is no longer well-formed XML, and one
/// inside the DIDL-Lite metadata is left as `&amp;`. Serve media from plain
/// paths when fixups are on.
pub fn apply_renderer_fixups(envelope: Vec<u8>) -> Result<Vec<u8>> {
    let text = String::from_utf8(envelope).map_err(marshal_error)?;
    Ok(text
        .replace("&#34;", "\"")
        .replace("&amp;", "&")
        .into_bytes())
}
