//! Subscription management and renderer state tracking for dlna-cast
//!
//! This crate keeps a GENA subscription alive against a renderer's
//! AVTransport event URL and tracks the playback state reported by its
//! NOTIFY events:
//!
//! - [`RendererStateStore`]: lock-protected table of sid → sequence-numbered
//!   state; events for non-members are rejected as zombie callbacks
//! - [`SubscriptionManager`]: SUBSCRIBE / renew / UNSUBSCRIBE for one device
//! - [`RenewalTask`]: the cancellable timer behind each live subscription
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dlna_api::DlnaClient;
//! use dlna_stream::{RendererStateStore, SubscribeOutcome, SubscriptionConfig, SubscriptionManager};
//!
//! let store = Arc::new(RendererStateStore::new());
//! let manager = SubscriptionManager::new(
//!     DlnaClient::new(),
//!     Arc::clone(&store),
//!     "http://192.168.1.40:1400/AVTransport/event",
//!     "http://192.168.1.10:3400/callback",
//!     SubscriptionConfig::default(),
//! );
//!
//! if let SubscribeOutcome::Subscribed { sid, .. } = manager.subscribe()? {
//!     assert!(store.is_member(&sid));
//!     manager.unsubscribe(&sid)?;
//! }
//! # Ok::<(), dlna_stream::SubscriptionError>(())
//! ```

pub mod config;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod subscription;

pub use config::SubscriptionConfig;
pub use error::{Result, StoreError, SubscriptionError};
pub use scheduler::RenewalTask;
pub use store::{EventDisposition, RendererState, RendererStateStore, SubscriptionInfo};
pub use subscription::{SubscribeOutcome, SubscriptionManager};
