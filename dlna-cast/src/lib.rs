//! # dlna-cast - control point for DLNA media renderers
//!
//! Loads a media URL (with an optional subtitle track) into a UPnP Media
//! Renderer, drives playback, and follows the renderer's transport state
//! through GENA events:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use callback_server::{CallbackServer, ServerConfig};
//! use dlna_cast::{ControlPoint, MediaSource, TvAction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     dlna_cast::logging::init_logging_from_env()?;
//!
//!     let server = CallbackServer::start(ServerConfig::default()).await?;
//!     let control_point = Arc::new(tokio::task::block_in_place(|| {
//!         ControlPoint::from_location("http://192.168.1.40:7676/dmr.xml", server.callback_url())
//!     })?);
//!     server.attach_sink(control_point.clone()).await;
//!
//!     control_point.set_media(MediaSource::new(
//!         "http://192.168.1.10:3500/movie.mp4",
//!         "video/mp4",
//!         "http://192.168.1.10:3500/movie.srt",
//!     ));
//!     let transitions = control_point.transitions();
//!     tokio::task::block_in_place(|| control_point.send_to_tv(TvAction::Play1))?;
//!
//!     while let Ok(transition) = transitions.recv() {
//!         println!("{} -> {:?}", transition.sid, transition.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! ```text
//! dlna-cast        ControlPoint, verbs, transition feed, logging
//!     ↓
//! dlna-stream      subscriptions, renewal timers, renderer state store
//!     ↓
//! dlna-api         envelopes, DIDL-Lite, device and NOTIFY parsing
//!     ↓
//! soap-client      blocking SOAP and GENA transport
//! ```
//!
//! `callback-server` receives the NOTIFY requests; [`ControlPoint`]
//! implements its `NotifySink`.

pub use action::TvAction;
pub use control_point::{ControlPoint, ControlPointBuilder, MediaSource};
pub use error::{CastError, Result};
pub use transition::TransportTransition;

pub use dlna_api::{DeviceCapabilities, PlaybackStatus};
pub use dlna_stream::{RendererStateStore, SubscriptionConfig};

mod action;
mod control_point;
mod error;
pub mod logging;
mod transition;

/// Parse a device description and build a control point for it
///
/// `location` is the URL the description was fetched from; relative
/// service paths are resolved against its scheme and host.
///
/// # Errors
/// A malformed description or a device without an AVTransport service.
pub fn build_control_point(
    description_xml: &str,
    location: &str,
    callback_url: impl Into<String>,
) -> Result<ControlPoint> {
    let capabilities = DeviceCapabilities::from_description(description_xml, location)?;
    Ok(ControlPoint::new(capabilities, callback_url))
}
