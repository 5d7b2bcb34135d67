//! Control point for one renderer
//!
//! Composes the typed actions of `dlna-api` with the subscription lifecycle
//! of `dlna-stream`:
//!
//! - `Play1` subscribes, loads the current media and plays it, in that order
//! - `Stop` drops every subscription of the session before stopping, and
//!   still stops when those unsubscribes fail
//! - mute and volume only need the RenderingControl URL
//! - inbound NOTIFY bodies are gated by the state store and published as
//!   [`TransportTransition`]s

use std::sync::{mpsc, Arc};

use callback_server::NotifySink;
use dlna_api::operations::av_transport::{
    PauseOperation, PauseRequest, PlayOperation, PlayRequest, SetAVTransportURIOperation,
    SetAVTransportURIRequest, StopOperation, StopRequest,
};
use dlna_api::operations::rendering_control::{
    GetMuteOperation, GetMuteRequest, GetVolumeOperation, GetVolumeRequest, SetMuteOperation,
    SetMuteRequest, SetVolumeOperation, SetVolumeRequest,
};
use dlna_api::{normalize_sid, parse_notify, DeviceCapabilities, DlnaClient};
use dlna_stream::{
    EventDisposition, RendererStateStore, SubscribeOutcome, SubscriptionConfig,
    SubscriptionManager,
};
use parking_lot::Mutex;

use crate::action::TvAction;
use crate::error::{CastError, Result};
use crate::transition::{TransitionFeed, TransportTransition};

/// The media item `Play1` loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub media_url: String,
    /// MIME type, e.g. `video/mp4`
    pub media_type: String,
    /// Served as `text/srt`; may be empty
    pub subtitle_url: String,
}

impl MediaSource {
    pub fn new(
        media_url: impl Into<String>,
        media_type: impl Into<String>,
        subtitle_url: impl Into<String>,
    ) -> Self {
        Self {
            media_url: media_url.into(),
            media_type: media_type.into(),
            subtitle_url: subtitle_url.into(),
        }
    }
}

/// Builder for a [`ControlPoint`]
///
/// Sessions that drive several renderers pass the same store to each
/// control point so that `Stop` on any of them ends every subscription.
pub struct ControlPointBuilder {
    capabilities: DeviceCapabilities,
    callback_url: String,
    client: Option<DlnaClient>,
    store: Option<Arc<RendererStateStore>>,
    config: SubscriptionConfig,
    media: Option<MediaSource>,
}

impl ControlPointBuilder {
    pub fn client(mut self, client: DlnaClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn store(mut self, store: Arc<RendererStateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn subscription_config(mut self, config: SubscriptionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn media(mut self, media: MediaSource) -> Self {
        self.media = Some(media);
        self
    }

    pub fn build(self) -> ControlPoint {
        let client = self.client.unwrap_or_default();
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(RendererStateStore::new()));
        let subscriptions = SubscriptionManager::new(
            client.clone(),
            store,
            self.capabilities.av_transport_event_url.clone(),
            self.callback_url,
            self.config,
        );

        ControlPoint {
            client,
            capabilities: self.capabilities,
            subscriptions,
            media: Mutex::new(self.media),
            transitions: TransitionFeed::default(),
        }
    }
}

/// Drives one DLNA media renderer
///
/// All methods take `&self`; wrap the control point in an [`Arc`] to share
/// it with the callback server.
pub struct ControlPoint {
    client: DlnaClient,
    capabilities: DeviceCapabilities,
    subscriptions: SubscriptionManager,
    media: Mutex<Option<MediaSource>>,
    transitions: TransitionFeed,
}

impl ControlPoint {
    pub fn builder(
        capabilities: DeviceCapabilities,
        callback_url: impl Into<String>,
    ) -> ControlPointBuilder {
        ControlPointBuilder {
            capabilities,
            callback_url: callback_url.into(),
            client: None,
            store: None,
            config: SubscriptionConfig::default(),
            media: None,
        }
    }

    /// Control point with a private store and default settings
    pub fn new(capabilities: DeviceCapabilities, callback_url: impl Into<String>) -> Self {
        Self::builder(capabilities, callback_url).build()
    }

    /// Fetch the device description at `location` and build a control point
    ///
    /// # Errors
    /// Transport errors, a malformed description, or a device without an
    /// AVTransport service.
    pub fn from_location(location: &str, callback_url: impl Into<String>) -> Result<Self> {
        let client = DlnaClient::new();
        let capabilities = client.fetch_description(location)?;
        tracing::info!(
            name = %capabilities.friendly_name,
            "found renderer at {}",
            location
        );
        Ok(Self::builder(capabilities, callback_url).client(client).build())
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn store(&self) -> &Arc<RendererStateStore> {
        self.subscriptions.store()
    }

    pub fn callback_url(&self) -> &str {
        self.subscriptions.callback_url()
    }

    /// Replace the media `Play1` loads
    pub fn set_media(&self, media: MediaSource) {
        *self.media.lock() = Some(media);
    }

    pub fn media(&self) -> Option<MediaSource> {
        self.media.lock().clone()
    }

    /// Receiver for transitions accepted from now on
    pub fn transitions(&self) -> mpsc::Receiver<TransportTransition> {
        self.transitions.subscribe()
    }

    /// Sequence of accepted events for `sid`
    pub fn sequence(&self, sid: &str) -> Result<u64> {
        Ok(self.store().get_sequence(&normalize_sid(sid))?)
    }

    /// Run one transport verb
    ///
    /// # Errors
    /// * `Play1`: [`CastError::NoMediaLoaded`] before any request is sent,
    ///   a subscribe transport error, or the failure of either SOAP action.
    ///   `Play` is never sent after a failed `SetAVTransportURI`.
    /// * `Stop`: only the failure of the `Stop` action itself.
    pub fn send_to_tv(&self, action: TvAction) -> Result<()> {
        let control_url = self.capabilities.av_transport_control_url.as_str();
        tracing::debug!(%action, "sending to renderer");

        match action {
            TvAction::Play1 => {
                let media = self.media().ok_or(CastError::NoMediaLoaded)?;

                match self.subscriptions.subscribe()? {
                    SubscribeOutcome::Subscribed { sid, timeout_seconds } => {
                        tracing::info!(sid = %sid, timeout = timeout_seconds, "subscribed before playback");
                    }
                    SubscribeOutcome::Refused { status } => {
                        tracing::warn!(status, "playing without transport events");
                    }
                }

                let load = SetAVTransportURIRequest::new(
                    media.media_url,
                    media.media_type,
                    media.subtitle_url,
                );
                self.client
                    .execute::<SetAVTransportURIOperation>(control_url, &load)?;
                self.client.execute::<PlayOperation>(control_url, &PlayRequest)?;
            }
            TvAction::Play => {
                self.client.execute::<PlayOperation>(control_url, &PlayRequest)?;
            }
            TvAction::Pause => {
                self.client.execute::<PauseOperation>(control_url, &PauseRequest)?;
            }
            TvAction::Stop => {
                for (sid, error) in self.subscriptions.unsubscribe_all() {
                    tracing::warn!(sid = %sid, "unsubscribe during stop failed: {}", error);
                }
                self.client.execute::<StopOperation>(control_url, &StopRequest)?;
            }
        }

        Ok(())
    }

    /// Parse `action` and run it
    pub fn send_action(&self, action: &str) -> Result<()> {
        self.send_to_tv(action.parse()?)
    }

    pub fn set_mute(&self, desired_mute: bool) -> Result<()> {
        let url = self.rendering_control_url()?;
        self.client
            .execute::<SetMuteOperation>(url, &SetMuteRequest { desired_mute })?;
        Ok(())
    }

    pub fn get_mute(&self) -> Result<bool> {
        let url = self.rendering_control_url()?;
        let response = self.client.execute::<GetMuteOperation>(url, &GetMuteRequest)?;
        Ok(response.current_mute)
    }

    /// Set the `Master` volume, 0 to 100
    pub fn set_volume(&self, desired_volume: u8) -> Result<()> {
        let url = self.rendering_control_url()?;
        self.client
            .execute::<SetVolumeOperation>(url, &SetVolumeRequest { desired_volume })?;
        Ok(())
    }

    pub fn get_volume(&self) -> Result<u8> {
        let url = self.rendering_control_url()?;
        let response = self
            .client
            .execute::<GetVolumeOperation>(url, &GetVolumeRequest)?;
        Ok(response.current_volume)
    }

    /// Handle one NOTIFY delivered for `sid`
    ///
    /// Returns `Ok(false)` for zombie callbacks (the sid is no longer
    /// tracked) and `Ok(true)` otherwise. The first event of a subscription
    /// is counted but not published.
    ///
    /// # Errors
    /// A malformed body; nothing is recorded then.
    pub fn on_notify(&self, sid: &str, body: &str) -> Result<bool> {
        let sid = normalize_sid(sid);
        let change = parse_notify(body)?;

        match self
            .store()
            .apply_event(&change.previous_state, &change.new_state, &sid)
        {
            EventDisposition::Rejected => {
                tracing::debug!(sid = %sid, "rejecting event for unknown subscription");
                Ok(false)
            }
            EventDisposition::FirstEventAbsorbed => {
                tracing::debug!(sid = %sid, state = %change.new_state, "ignoring initial event");
                Ok(true)
            }
            EventDisposition::Accepted { sequence } => {
                let status = change.status();
                tracing::info!(sid = %sid, state = %change.new_state, sequence, "transport state changed");
                self.transitions.publish(TransportTransition {
                    sid,
                    previous_state: change.previous_state,
                    new_state: change.new_state,
                    status,
                    sequence,
                });
                Ok(true)
            }
        }
    }

    fn rendering_control_url(&self) -> Result<&str> {
        self.capabilities
            .rendering_control_url
            .as_deref()
            .ok_or(CastError::RenderingControlUnavailable)
    }
}

impl NotifySink for ControlPoint {
    fn notify(&self, sid: &str, body: &str) -> bool {
        match self.on_notify(sid, body) {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(sid, "dropping malformed event: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ControlPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPoint")
            .field("capabilities", &self.capabilities)
            .field("callback_url", &self.callback_url())
            .finish_non_exhaustive()
    }
}
