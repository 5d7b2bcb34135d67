//! DIDL-Lite metadata for `SetAVTransportURI`

use percent_encoding::percent_decode_str;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use url::Url;

use crate::error::{marshal_error, Result};

const DIDL_NS: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const SEC_NS: &str = "http://www.sec.co.kr/";
const UPNP_NS: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";

pub const AUDIO_ITEM_CLASS: &str = "object.item.audioItem.musicTrack";
pub const VIDEO_ITEM_CLASS: &str = "object.item.videoItem.movie";

/// Media item described by the embedded DIDL-Lite document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidlItem {
    pub media_url: String,
    pub media_type: String,
    /// Subtitle URL; an empty string still produces the subtitle resource
    pub subtitle_url: String,
    pub title: String,
}

impl DidlItem {
    /// Describe a media item, titled after the media URL's path
    pub fn new(
        media_url: impl Into<String>,
        media_type: impl Into<String>,
        subtitle_url: impl Into<String>,
    ) -> Self {
        let media_url = media_url.into();
        let title = default_title(&media_url);
        Self {
            media_url,
            media_type: media_type.into(),
            subtitle_url: subtitle_url.into(),
            title,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// UPnP class of the item, derived from the MIME type
    pub fn item_class(&self) -> &'static str {
        if self.media_type.starts_with("audio/") {
            AUDIO_ITEM_CLASS
        } else {
            VIDEO_ITEM_CLASS
        }
    }

    /// Serialize the DIDL-Lite document
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let media_protocol = format!("http-get:*:{}:*", self.media_type);

        let root = BytesStart::new("DIDL-Lite").with_attributes([
            ("xmlns", DIDL_NS),
            ("xmlns:dc", DC_NS),
            ("xmlns:sec", SEC_NS),
            ("xmlns:upnp", UPNP_NS),
        ]);
        writer.write_event(Event::Start(root)).map_err(marshal_error)?;

        let item = BytesStart::new("item").with_attributes([
            ("id", "1"),
            ("parentID", "0"),
            ("restricted", "1"),
        ]);
        writer.write_event(Event::Start(item)).map_err(marshal_error)?;

        write_element(&mut writer, "sec:CaptionInfo", &[("sec:type", "srt")], &self.subtitle_url)?;
        write_element(&mut writer, "sec:CaptionInfoEx", &[("sec:type", "srt")], &self.subtitle_url)?;
        write_element(&mut writer, "dc:title", &[], &self.title)?;
        write_element(&mut writer, "upnp:class", &[], self.item_class())?;
        write_element(&mut writer, "res", &[("protocolInfo", media_protocol.as_str())], &self.media_url)?;
        write_element(
            &mut writer,
            "res",
            &[("protocolInfo", "http-get:*:text/srt:*")],
            &self.subtitle_url,
        )?;

        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .map_err(marshal_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("DIDL-Lite")))
            .map_err(marshal_error)?;

        String::from_utf8(writer.into_inner()).map_err(marshal_error)
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Start(start)).map_err(marshal_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(marshal_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(marshal_error)?;
    Ok(())
}

/// Title used when none is given: the decoded URL path without leading slashes
///
/// Falls back to the raw string when it is not a parseable URL.
pub fn default_title(media_url: &str) -> String {
    match Url::parse(media_url) {
        Ok(url) => percent_decode_str(url.path())
            .decode_utf8_lossy()
            .trim_start_matches('/')
            .to_string(),
        Err(_) => media_url.to_string(),
    }
}
