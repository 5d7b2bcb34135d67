//! Renderer state table keyed by subscription id.
//!
//! One `parking_lot` mutex guards both the per-sid playback state and the
//! subscription records (lease and renewal timer). It is only ever held for
//! the in-memory mutation; renewal handles removed from the table are dropped
//! after the guard is released.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::scheduler::RenewalTask;

/// Playback state tracked for one sid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererState {
    /// Last `CurrentTransportActions` value
    pub previous_state: String,
    /// Last `TransportState` value
    pub new_state: String,
    /// Number of events accepted for this sid
    pub sequence: u64,
}

/// Outcome of [`RendererStateStore::apply_event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// The sid is not a member: zombie callback
    Rejected,
    /// First event after subscribing: counted, state untouched
    FirstEventAbsorbed,
    /// State recorded at this sequence
    Accepted { sequence: u64 },
}

impl EventDisposition {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, EventDisposition::Rejected)
    }
}

/// Read-only view of a tracked subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub sid: String,
    pub event_url: String,
    pub timeout_seconds: u32,
}

/// A live subscription and its renewal timer
#[derive(Debug)]
pub(crate) struct Subscription {
    pub(crate) sid: String,
    pub(crate) event_url: String,
    pub(crate) timeout_seconds: u32,
    // Held for its drop: removing the record cancels the timer
    pub(crate) _renewal: Option<RenewalTask>,
}

impl Subscription {
    fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            sid: self.sid.clone(),
            event_url: self.event_url.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<String, RendererState>,
    subscriptions: HashMap<String, Subscription>,
}

/// Thread-safe table of renderer states keyed by sid
///
/// A sid is a member from [`create`](Self::create) until
/// [`delete`](Self::delete). Updates for non-members are rejected, never
/// buffered.
#[derive(Debug, Default)]
pub struct RendererStateStore {
    inner: Mutex<Inner>,
}

impl RendererStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sid` at sequence 0; no-op for an existing member
    pub fn create(&self, sid: &str) {
        self.inner
            .lock()
            .states
            .entry(sid.to_string())
            .or_default();
    }

    /// Record a state change, returning `false` when `sid` is not a member
    pub fn update(&self, previous_state: &str, new_state: &str, sid: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.states.get_mut(sid) {
            Some(state) => {
                state.previous_state = previous_state.to_string();
                state.new_state = new_state.to_string();
                state.sequence += 1;
                true
            }
            None => false,
        }
    }

    /// Remove `sid` and cancel its renewal, returning whether it was a member
    pub fn delete(&self, sid: &str) -> bool {
        self.remove(sid).0
    }

    /// Advance the sequence without touching the state
    pub fn increment_sequence(&self, sid: &str) -> bool {
        match self.inner.lock().states.get_mut(sid) {
            Some(state) => {
                state.sequence += 1;
                true
            }
            None => false,
        }
    }

    pub fn get_sequence(&self, sid: &str) -> Result<u64, StoreError> {
        self.inner
            .lock()
            .states
            .get(sid)
            .map(|state| state.sequence)
            .ok_or_else(|| StoreError::UnknownSubscription(sid.to_string()))
    }

    /// Apply one NOTIFY under a single lock acquisition
    ///
    /// Sequence 0 means no real event has been seen yet: the event is
    /// counted but not recorded. Renderers commonly send a stale `STOPPED`
    /// right after a subscription is opened.
    pub fn apply_event(&self, previous_state: &str, new_state: &str, sid: &str) -> EventDisposition {
        let mut inner = self.inner.lock();
        let Some(state) = inner.states.get_mut(sid) else {
            return EventDisposition::Rejected;
        };

        if state.sequence == 0 {
            state.sequence = 1;
            return EventDisposition::FirstEventAbsorbed;
        }

        state.previous_state = previous_state.to_string();
        state.new_state = new_state.to_string();
        state.sequence += 1;
        EventDisposition::Accepted {
            sequence: state.sequence,
        }
    }

    pub fn is_member(&self, sid: &str) -> bool {
        self.inner.lock().states.contains_key(sid)
    }

    pub fn state(&self, sid: &str) -> Option<RendererState> {
        self.inner.lock().states.get(sid).cloned()
    }

    /// Sids of every member, sorted
    pub fn tracked_sids(&self) -> Vec<String> {
        let mut sids: Vec<String> = self.inner.lock().states.keys().cloned().collect();
        sids.sort();
        sids
    }

    pub fn subscription(&self, sid: &str) -> Option<SubscriptionInfo> {
        self.inner.lock().subscriptions.get(sid).map(Subscription::info)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make `subscription` a member at sequence 0, replacing any other
    /// subscription opened on the same event URL
    ///
    /// A sid granted again by the renderer starts over as well.
    pub(crate) fn track(&self, subscription: Subscription) {
        let replaced = {
            let mut inner = self.inner.lock();
            let stale: Vec<String> = inner
                .subscriptions
                .values()
                .filter(|existing| {
                    existing.event_url == subscription.event_url && existing.sid != subscription.sid
                })
                .map(|existing| existing.sid.clone())
                .collect();

            let mut replaced = Vec::with_capacity(stale.len() + 1);
            for sid in stale {
                inner.states.remove(&sid);
                replaced.extend(inner.subscriptions.remove(&sid));
            }

            inner
                .states
                .insert(subscription.sid.clone(), RendererState::default());
            replaced.extend(
                inner
                    .subscriptions
                    .insert(subscription.sid.clone(), subscription),
            );
            replaced
        };

        for old in &replaced {
            tracing::debug!(sid = %old.sid, "replaced subscription on {}", old.event_url);
        }
    }

    /// Store the lease granted by a renewal; `false` for non-members
    pub(crate) fn set_timeout(&self, sid: &str, timeout_seconds: u32) -> bool {
        match self.inner.lock().subscriptions.get_mut(sid) {
            Some(subscription) => {
                subscription.timeout_seconds = timeout_seconds;
                true
            }
            None => false,
        }
    }

    /// Remove `sid`, returning membership and the dropped subscription's info
    pub(crate) fn remove(&self, sid: &str) -> (bool, Option<SubscriptionInfo>) {
        let (was_member, subscription) = {
            let mut inner = self.inner.lock();
            let was_member = inner.states.remove(sid).is_some();
            (was_member, inner.subscriptions.remove(sid))
        };
        let info = subscription.as_ref().map(Subscription::info);
        drop(subscription);
        (was_member, info)
    }

    /// Remove every member opened on `event_url`
    pub(crate) fn release_device(&self, event_url: &str) -> Vec<SubscriptionInfo> {
        let removed: Vec<Subscription> = {
            let mut inner = self.inner.lock();
            let sids: Vec<String> = inner
                .subscriptions
                .values()
                .filter(|subscription| subscription.event_url == event_url)
                .map(|subscription| subscription.sid.clone())
                .collect();
            sids.iter()
                .filter_map(|sid| {
                    inner.states.remove(sid);
                    inner.subscriptions.remove(sid)
                })
                .collect()
        };
        removed.iter().map(Subscription::info).collect()
    }

    /// Remove every member and return the subscriptions that were tracked
    pub(crate) fn drain(&self) -> Vec<SubscriptionInfo> {
        let removed: Vec<Subscription> = {
            let mut inner = self.inner.lock();
            inner.states.clear();
            inner.subscriptions.drain().map(|(_, subscription)| subscription).collect()
        };
        let mut infos: Vec<SubscriptionInfo> = removed.iter().map(Subscription::info).collect();
        infos.sort_by(|a, b| a.sid.cmp(&b.sid));
        infos
    }
}
