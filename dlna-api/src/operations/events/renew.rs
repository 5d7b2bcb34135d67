//! Renew operation for UPnP event subscriptions

use super::{parse_timeout, wire_sid};
use crate::{ApiError, Result};

/// Renew operation for UPnP event subscriptions
///
/// Extends an existing lease in place: same SID, `SUBSCRIBE` with `SID` and
/// `TIMEOUT` headers only.
pub struct RenewOperation;

/// Request for Renew operation
#[derive(Debug, Clone)]
pub struct RenewRequest {
    /// Normalized subscription ID to renew
    pub sid: String,
    /// Requested lease in seconds
    pub timeout_seconds: u32,
}

/// Response for Renew operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewResponse {
    /// Lease granted by the renderer, in seconds
    pub timeout_seconds: u32,
}

impl RenewOperation {
    /// Execute a renewal request against an event URL
    ///
    /// Any non-200 answer is `ApiError::HttpStatus`.
    pub fn execute(
        soap_client: &soap_client::SoapClient,
        event_url: &str,
        request: &RenewRequest,
    ) -> Result<RenewResponse> {
        let response = soap_client.renew_subscription(
            event_url,
            &wire_sid(&request.sid),
            request.timeout_seconds,
        )?;

        if !response.is_ok() {
            return Err(ApiError::HttpStatus(response.status));
        }

        Ok(RenewResponse {
            timeout_seconds: parse_timeout(response.timeout.as_deref()),
        })
    }
}
