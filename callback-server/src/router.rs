//! Routing of incoming NOTIFY requests to the attached sink.
//!
//! The router holds at most one [`NotifySink`]. Until one is attached every
//! event is answered as unknown, so a server can be started (and its callback
//! URL handed out) before the control point that consumes the events exists.

use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consumer of GENA event notifications
///
/// `notify` receives the `SID` header exactly as sent by the renderer and
/// the raw NOTIFY body. It returns `true` when the event was accepted and
/// `false` for zombie callbacks and bodies it could not parse. It runs on
/// the server's request task and must not block on I/O.
pub trait NotifySink: Send + Sync {
    fn notify(&self, sid: &str, body: &str) -> bool;
}

impl<F> NotifySink for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn notify(&self, sid: &str, body: &str) -> bool {
        self(sid, body)
    }
}

/// Forwards events to the currently attached sink
#[derive(Clone, Default)]
pub struct NotifyRouter {
    sink: Arc<RwLock<Option<Arc<dyn NotifySink>>>>,
}

impl NotifyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `sink`, replacing any previous one
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use callback_server::NotifyRouter;
    /// # #[tokio::main]
    /// # async fn main() {
    /// let router = NotifyRouter::new();
    /// router.attach(Arc::new(|_sid: &str, _body: &str| true)).await;
    /// assert!(router.route_event("uuid:abc", "<e:propertyset/>").await);
    /// # }
    /// ```
    pub async fn attach(&self, sink: Arc<dyn NotifySink>) {
        *self.sink.write().await = Some(sink);
    }

    /// Detach the current sink; later events are answered as unknown
    pub async fn detach(&self) {
        *self.sink.write().await = None;
    }

    pub async fn has_sink(&self) -> bool {
        self.sink.read().await.is_some()
    }

    /// Hand one event to the sink
    ///
    /// Returns `false` when no sink is attached or the sink rejected it.
    pub async fn route_event(&self, sid: &str, body: &str) -> bool {
        let sink = self.sink.read().await.clone();
        match sink {
            Some(sink) => sink.notify(sid, body),
            None => {
                tracing::debug!(sid, "no sink attached, dropping event");
                false
            }
        }
    }
}

impl fmt::Debug for NotifyRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyRouter").finish_non_exhaustive()
    }
}
