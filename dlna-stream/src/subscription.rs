//! GENA subscription lifecycle for one renderer.
//!
//! States per device: unsubscribed, subscribing, subscribed, renewing. A
//! successful `SUBSCRIBE` registers the sid in the shared
//! [`RendererStateStore`] at sequence 0 and starts its renewal timer; a
//! failed renewal or an explicit unsubscribe removes it again.

use std::sync::{Arc, Weak};

use dlna_api::{normalize_sid, ApiError, DlnaClient};

use crate::config::SubscriptionConfig;
use crate::error::{Result, StoreError, SubscriptionError};
use crate::scheduler::RenewalTask;
use crate::store::{RendererStateStore, Subscription};

/// Result of a fresh `SUBSCRIBE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// The renderer granted a lease; the sid is now a store member
    Subscribed { sid: String, timeout_seconds: u32 },
    /// The renderer answered with a non-200 status
    ///
    /// Many renderers refuse subscriptions they do not support and still
    /// play media, so this is not an error. Previously tracked state for the
    /// device has been dropped.
    Refused { status: u16 },
}

impl SubscribeOutcome {
    pub fn sid(&self) -> Option<&str> {
        match self {
            SubscribeOutcome::Subscribed { sid, .. } => Some(sid),
            SubscribeOutcome::Refused { .. } => None,
        }
    }
}

#[derive(Debug)]
struct Shared {
    client: DlnaClient,
    store: Arc<RendererStateStore>,
    event_url: String,
    callback_url: String,
    config: SubscriptionConfig,
}

/// Owns the SUBSCRIBE / renew / UNSUBSCRIBE protocol against one event URL
///
/// Cloning is cheap; clones share the same device and store.
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    shared: Arc<Shared>,
}

impl SubscriptionManager {
    pub fn new(
        client: DlnaClient,
        store: Arc<RendererStateStore>,
        event_url: impl Into<String>,
        callback_url: impl Into<String>,
        config: SubscriptionConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                store,
                event_url: event_url.into(),
                callback_url: callback_url.into(),
                config,
            }),
        }
    }

    pub fn store(&self) -> &Arc<RendererStateStore> {
        &self.shared.store
    }

    pub fn event_url(&self) -> &str {
        &self.shared.event_url
    }

    pub fn callback_url(&self) -> &str {
        &self.shared.callback_url
    }

    pub fn config(&self) -> &SubscriptionConfig {
        &self.shared.config
    }

    /// Open a fresh subscription and schedule its renewal
    ///
    /// Replaces any subscription this device already had in the store.
    ///
    /// # Errors
    /// Transport failures, a 200 answer without `SID`, and a renewal timer
    /// that cannot be started (the lease is released again). A non-200
    /// answer is reported as [`SubscribeOutcome::Refused`].
    pub fn subscribe(&self) -> Result<SubscribeOutcome> {
        let shared = &self.shared;
        let response = match shared.client.subscribe(
            &shared.event_url,
            &shared.callback_url,
            shared.config.requested_timeout_secs,
        ) {
            Ok(response) => response,
            Err(ApiError::HttpStatus(status)) => {
                let released = shared.store.release_device(&shared.event_url);
                tracing::warn!(
                    status,
                    event_url = %shared.event_url,
                    released = released.len(),
                    "renderer refused event subscription, continuing without events"
                );
                return Ok(SubscribeOutcome::Refused { status });
            }
            Err(e) => return Err(e.into()),
        };

        let renewal = match self.schedule_renewal(&response.sid, response.timeout_seconds) {
            Ok(renewal) => renewal,
            Err(source) => {
                tracing::error!(sid = %response.sid, "failed to start renewal task: {}", source);
                if let Err(e) = shared.client.unsubscribe(&shared.event_url, &response.sid) {
                    tracing::warn!(sid = %response.sid, "unsubscribe of unrenewable lease failed: {}", e);
                }
                return Err(SubscriptionError::Renewal {
                    sid: response.sid,
                    source,
                });
            }
        };
        shared.store.track(Subscription {
            sid: response.sid.clone(),
            event_url: shared.event_url.clone(),
            timeout_seconds: response.timeout_seconds,
            _renewal: Some(renewal),
        });

        tracing::info!(
            sid = %response.sid,
            timeout = response.timeout_seconds,
            "subscribed to {}",
            shared.event_url
        );

        Ok(SubscribeOutcome::Subscribed {
            sid: response.sid,
            timeout_seconds: response.timeout_seconds,
        })
    }

    /// Renew `sid` in place, returning the granted lease in seconds
    ///
    /// On failure the subscription is dropped (locally and, best effort, on
    /// the renderer) and the renewal error is returned.
    pub fn renew(&self, sid: &str) -> Result<u32> {
        let sid = normalize_sid(sid);
        let shared = &self.shared;
        let event_url = shared
            .store
            .subscription(&sid)
            .map(|info| info.event_url)
            .ok_or_else(|| StoreError::UnknownSubscription(sid.clone()))?;

        match shared
            .client
            .renew(&event_url, &sid, shared.config.requested_timeout_secs)
        {
            Ok(response) => {
                if shared.store.set_timeout(&sid, response.timeout_seconds) {
                    tracing::debug!(sid = %sid, timeout = response.timeout_seconds, "renewed subscription");
                } else {
                    tracing::debug!(sid = %sid, "subscription dropped while renewing");
                }
                Ok(response.timeout_seconds)
            }
            Err(e) => {
                tracing::warn!(sid = %sid, "renewal failed, dropping subscription: {}", e);
                if let Err(cleanup) = self.unsubscribe(&sid) {
                    tracing::warn!(sid = %sid, "unsubscribe after failed renewal failed: {}", cleanup);
                }
                Err(e.into())
            }
        }
    }

    /// Drop `sid` locally, then send `UNSUBSCRIBE`
    ///
    /// Late events for `sid` are zombies from the moment this is called. A
    /// 412 answer counts as success; transport errors are returned but the
    /// local state stays removed.
    pub fn unsubscribe(&self, sid: &str) -> Result<()> {
        let sid = normalize_sid(sid);
        let shared = &self.shared;
        let (was_member, info) = shared.store.remove(&sid);
        if !was_member {
            tracing::debug!(sid = %sid, "no local state to remove");
        }

        let event_url = info
            .map(|info| info.event_url)
            .unwrap_or_else(|| shared.event_url.clone());
        let response = shared.client.unsubscribe(&event_url, &sid)?;
        if response.already_expired {
            tracing::warn!(sid = %sid, "renderer no longer knew the subscription (412)");
        } else {
            tracing::info!(sid = %sid, "unsubscribed from {}", event_url);
        }
        Ok(())
    }

    /// Unsubscribe every subscription tracked in the store
    ///
    /// All local state and renewal timers are dropped before the first
    /// request is sent. Failures are collected, not returned early.
    pub fn unsubscribe_all(&self) -> Vec<(String, SubscriptionError)> {
        let shared = &self.shared;
        let tracked = shared.store.drain();

        tracked
            .into_iter()
            .filter_map(|info| match shared.client.unsubscribe(&info.event_url, &info.sid) {
                Ok(response) => {
                    if response.already_expired {
                        tracing::warn!(sid = %info.sid, "renderer no longer knew the subscription (412)");
                    }
                    None
                }
                Err(e) => Some((info.sid, SubscriptionError::from(e))),
            })
            .collect()
    }

    fn schedule_renewal(&self, sid: &str, timeout_seconds: u32) -> std::io::Result<RenewalTask> {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let renew_sid = sid.to_string();
        let first_delay = self.shared.config.renewal_delay(timeout_seconds);

        RenewalTask::spawn(sid, first_delay, move || {
            let manager = SubscriptionManager {
                shared: weak.upgrade()?,
            };
            if !manager.shared.store.is_member(&renew_sid) {
                tracing::debug!(sid = %renew_sid, "skipping renewal for removed subscription");
                return None;
            }
            manager
                .renew(&renew_sid)
                .ok()
                .map(|timeout| manager.shared.config.renewal_delay(timeout))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_sid() {
        let subscribed = SubscribeOutcome::Subscribed {
            sid: "abc".to_string(),
            timeout_seconds: 300,
        };
        assert_eq!(subscribed.sid(), Some("abc"));
        assert_eq!(SubscribeOutcome::Refused { status: 503 }.sid(), None);
    }

    #[test]
    fn test_renew_unknown_sid() {
        let manager = SubscriptionManager::new(
            DlnaClient::new(),
            Arc::new(RendererStateStore::new()),
            "http://127.0.0.1:9/evt",
            "http://127.0.0.1:9/callback",
            SubscriptionConfig::default(),
        );

        assert!(matches!(
            manager.renew("uuid:missing"),
            Err(SubscriptionError::Store(StoreError::UnknownSubscription(sid))) if sid == "missing"
        ));
    }
}
