//! GENA event parsing
//!
//! Renderers push AVTransport state changes as NOTIFY bodies shaped
//! `propertyset > property > LastChange > Event > InstanceID > *@val`.

mod av_transport;

pub use av_transport::{parse_notify, PlaybackStatus, TransportChange};
