//! Type-safe UPnP API for DLNA media renderers
//!
//! This crate provides the protocol layer of a DLNA control point: exact SOAP
//! envelopes for the AVTransport and RenderingControl actions, DIDL-Lite
//! metadata, device description and NOTIFY parsing, and the GENA
//! subscription operations. It uses the private `soap-client` crate for the
//! HTTP transport.
//!
//! ```rust,no_run
//! use dlna_api::DlnaClient;
//! use dlna_api::operations::av_transport::{
//!     PlayOperation, PlayRequest, SetAVTransportURIOperation, SetAVTransportURIRequest,
//! };
//!
//! let client = DlnaClient::new();
//! let caps = client.fetch_description("http://192.168.1.40:1400/desc.xml")?;
//!
//! let load = SetAVTransportURIRequest::new(
//!     "http://192.168.1.10:3500/movie.mp4",
//!     "video/mp4",
//!     "http://192.168.1.10:3500/movie.srt",
//! );
//! client.execute::<SetAVTransportURIOperation>(&caps.av_transport_control_url, &load)?;
//! client.execute::<PlayOperation>(&caps.av_transport_control_url, &PlayRequest)?;
//! # Ok::<(), dlna_api::ApiError>(())
//! ```

pub mod client;
pub mod device;
pub mod didl;
pub mod envelope;
pub mod error;
pub mod events;
pub mod operation;
pub mod operations;
pub mod service;

pub use client::DlnaClient;
pub use device::DeviceCapabilities;
pub use didl::DidlItem;
pub use envelope::{SoapEnvelopeBuilder, XML_DECLARATION};
pub use error::{ApiError, Result};
pub use events::{parse_notify, PlaybackStatus, TransportChange};
pub use operation::{PendingAction, UpnpOperation};
pub use operations::events::{normalize_sid, parse_timeout, DEFAULT_TIMEOUT_SECONDS};
pub use service::{Service, ServiceInfo};
