//! Typed UPnP operations
//!
//! `av_transport` and `rendering_control` hold the SOAP actions;
//! `events` holds the GENA subscription operations, which use the HTTP
//! `SUBSCRIBE`/`UNSUBSCRIBE` verbs instead of a SOAP POST.

pub mod av_transport;
pub mod events;
pub mod rendering_control;
