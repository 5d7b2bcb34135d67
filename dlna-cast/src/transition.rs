//! Feed of playback transitions reported by renderers

use std::sync::mpsc;

use dlna_api::PlaybackStatus;
use parking_lot::Mutex;

/// One accepted AVTransport state change
///
/// The first event after subscribing is never published: renderers report
/// a stale state there, typically `STOPPED` just before playback starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportTransition {
    pub sid: String,
    pub previous_state: String,
    pub new_state: String,
    pub status: PlaybackStatus,
    /// Store sequence the event was accepted at
    pub sequence: u64,
}

/// Fan-out of transitions to any number of receivers
///
/// Receivers that were dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub(crate) struct TransitionFeed {
    senders: Mutex<Vec<mpsc::Sender<TransportTransition>>>,
}

impl TransitionFeed {
    pub(crate) fn subscribe(&self) -> mpsc::Receiver<TransportTransition> {
        let (tx, rx) = mpsc::channel();
        self.senders.lock().push(tx);
        rx
    }

    /// Returns the number of receivers the transition reached
    pub(crate) fn publish(&self, transition: TransportTransition) -> usize {
        let mut senders = self.senders.lock();
        senders.retain(|tx| tx.send(transition.clone()).is_ok());
        senders.len()
    }
}
