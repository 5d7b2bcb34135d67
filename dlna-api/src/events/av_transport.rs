//! AVTransport `LastChange` parsing

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ApiError, Result};

const NOTIFY_PATH: [&str; 3] = ["propertyset", "property", "LastChange"];
const INSTANCE_PATH: [&str; 2] = ["Event", "InstanceID"];

/// The (previous, new) state pair carried by one AVTransport event
///
/// `previous_state` comes from `CurrentTransportActions`, `new_state` from
/// `TransportState`. Either is empty when the renderer omits the variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportChange {
    pub previous_state: String,
    pub new_state: String,
}

impl TransportChange {
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus::from_transport_state(&self.new_state)
    }
}

/// Playback status derived from a `TransportState` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
    Transitioning,
    NoMediaPresent,
    /// Vendor-specific or empty state, kept verbatim
    Other(String),
}

impl PlaybackStatus {
    pub fn from_transport_state(state: &str) -> Self {
        match state {
            "PLAYING" => PlaybackStatus::Playing,
            "PAUSED_PLAYBACK" | "PAUSED_RECORDING" => PlaybackStatus::Paused,
            "STOPPED" => PlaybackStatus::Stopped,
            "TRANSITIONING" => PlaybackStatus::Transitioning,
            "NO_MEDIA_PRESENT" => PlaybackStatus::NoMediaPresent,
            other => PlaybackStatus::Other(other.to_string()),
        }
    }
}

/// Parse a NOTIFY body into its transport state change
///
/// Accepts the event either inline under `<LastChange>` or as escaped text
/// inside it, which is how it travels on the wire.
///
/// # Errors
/// `ApiError::ParseError` for malformed XML or a root other than `propertyset`.
/// Missing state variables are not an error.
pub fn parse_notify(body: &str) -> Result<TransportChange> {
    let mut change = TransportChange::default();
    scan(body, &NOTIFY_PATH, &mut change)?;
    Ok(change)
}

/// Walk one document, recording `val` attributes found under
/// `outer > Event > InstanceID`
fn scan(xml: &str, outer: &[&str], change: &mut TransportChange) -> Result<()> {
    let expected_root = outer.first().copied().unwrap_or(INSTANCE_PATH[0]);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(element) => {
                let name = local_name(&element);
                check_root(&mut seen_root, &path, &name, expected_root)?;
                path.push(name);
                record(&element, &path, outer, change)?;
            }
            Event::Empty(element) => {
                let name = local_name(&element);
                check_root(&mut seen_root, &path, &name, expected_root)?;
                path.push(name);
                record(&element, &path, outer, change)?;
                path.pop();
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(text) if is_last_change(&path, outer) => {
                let inner = text.unescape().map_err(parse_error)?;
                scan(&inner, &[], change)?;
            }
            Event::CData(data) if is_last_change(&path, outer) => {
                let inner = String::from_utf8(data.into_inner().into_owned())
                    .map_err(parse_error)?;
                scan(&inner, &[], change)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ApiError::ParseError("empty event document".to_string()));
    }
    if !path.is_empty() {
        return Err(ApiError::ParseError(format!(
            "unexpected end of event document inside <{}>",
            path.join(">")
        )));
    }
    Ok(())
}

fn check_root(seen_root: &mut bool, path: &[String], name: &str, expected: &str) -> Result<()> {
    if !path.is_empty() {
        return Ok(());
    }
    if *seen_root {
        return Err(ApiError::ParseError("multiple root elements".to_string()));
    }
    if name != expected {
        return Err(ApiError::ParseError(format!(
            "expected <{}> root, found <{}>",
            expected, name
        )));
    }
    *seen_root = true;
    Ok(())
}

fn record(
    element: &BytesStart,
    path: &[String],
    outer: &[&str],
    change: &mut TransportChange,
) -> Result<()> {
    let depth = outer.len() + INSTANCE_PATH.len();
    if path.len() != depth + 1 {
        return Ok(());
    }
    let under_instance = outer
        .iter()
        .chain(INSTANCE_PATH.iter())
        .zip(path.iter())
        .all(|(expected, actual)| *expected == actual);
    if !under_instance {
        return Ok(());
    }

    let slot = match path[depth].as_str() {
        "TransportState" => &mut change.new_state,
        "CurrentTransportActions" => &mut change.previous_state,
        _ => return Ok(()),
    };
    if let Some(value) = element.try_get_attribute("val").map_err(parse_error)? {
        *slot = value.unescape_value().map_err(parse_error)?.into_owned();
    }
    Ok(())
}

fn is_last_change(path: &[String], outer: &[&str]) -> bool {
    !outer.is_empty()
        && path.len() == outer.len()
        && outer.iter().zip(path.iter()).all(|(expected, actual)| *expected == actual)
}

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn parse_error(error: impl std::fmt::Display) -> ApiError {
    ApiError::ParseError(format!("Malformed event XML: {}", error))
}
