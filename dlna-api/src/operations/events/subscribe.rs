//! Subscribe operation for UPnP event subscriptions

use super::{normalize_sid, parse_timeout};
use crate::{ApiError, Result};

/// Subscribe operation for UPnP event subscriptions
///
/// Opens a fresh subscription with `CALLBACK`, `NT: upnp:event` and
/// `TIMEOUT`. Unlike regular SOAP operations, this uses the HTTP `SUBSCRIBE`
/// method instead of POST.
pub struct SubscribeOperation;

/// Request for Subscribe operation
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    /// The callback URL where events should be sent
    pub callback_url: String,
    /// Requested subscription timeout in seconds
    pub timeout_seconds: u32,
}

/// Response for Subscribe operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeResponse {
    /// Normalized subscription ID returned by the renderer
    pub sid: String,
    /// Lease granted by the renderer, in seconds
    pub timeout_seconds: u32,
}

impl SubscribeOperation {
    /// Execute a subscription request against an event URL
    ///
    /// # Errors
    /// * `ApiError::HttpStatus` when the renderer answers with anything but 200
    /// * `ApiError::SubscriptionError` when a 200 answer carries no `SID`
    /// * `ApiError::NetworkError` on transport failure
    pub fn execute(
        soap_client: &soap_client::SoapClient,
        event_url: &str,
        request: &SubscribeRequest,
    ) -> Result<SubscribeResponse> {
        let response =
            soap_client.subscribe(event_url, &request.callback_url, request.timeout_seconds)?;

        if !response.is_ok() {
            return Err(ApiError::HttpStatus(response.status));
        }

        let sid = response
            .sid
            .as_deref()
            .map(normalize_sid)
            .filter(|sid| !sid.is_empty())
            .ok_or_else(|| {
                ApiError::SubscriptionError("SUBSCRIBE response carried no SID".to_string())
            })?;

        Ok(SubscribeResponse {
            sid,
            timeout_seconds: parse_timeout(response.timeout.as_deref()),
        })
    }
}
