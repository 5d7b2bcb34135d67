//! HTTP callback endpoint for GENA event notifications.
//!
//! Renderers deliver their events as `NOTIFY` requests to the callback URL
//! given at subscription time. This crate owns that endpoint and nothing
//! else: it validates the UPnP headers, hands `(sid, body)` to a
//! [`NotifySink`] and maps the sink's verdict onto the HTTP answer.
//!
//! | Outcome | Status |
//! |---|---|
//! | sink accepted the event | 200 |
//! | unknown sid, malformed body, no sink attached | 404 |
//! | missing `SID`, wrong `NT`/`NTS` | 400 |
//!
//! The 404 answer for zombie callbacks keeps renderers from retrying
//! aggressively, as they would after a 5xx.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use callback_server::{CallbackServer, NotifySink, ServerConfig};
//!
//! struct PrintSink;
//!
//! impl NotifySink for PrintSink {
//!     fn notify(&self, sid: &str, body: &str) -> bool {
//!         println!("{sid}: {} bytes", body.len());
//!         true
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), callback_server::ServerError> {
//!     let server = CallbackServer::start(ServerConfig::default()).await?;
//!     server.attach_sink(Arc::new(PrintSink)).await;
//!
//!     println!("subscribe with CALLBACK <{}>", server.callback_url());
//!
//!     server.shutdown().await
//! }
//! ```

pub mod router;
mod server;

pub use router::{NotifyRouter, NotifySink};
pub use server::{CallbackServer, ServerConfig, ServerError};
