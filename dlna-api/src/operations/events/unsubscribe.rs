//! Unsubscribe operation for UPnP event subscriptions

use super::wire_sid;
use crate::{ApiError, Result};

const PRECONDITION_FAILED: u16 = 412;

/// Unsubscribe operation for UPnP event subscriptions
///
/// A `412 Precondition Failed` answer means the renderer already forgot the
/// subscription; it is reported as success with `already_expired` set.
pub struct UnsubscribeOperation;

/// Request for Unsubscribe operation
#[derive(Debug, Clone)]
pub struct UnsubscribeRequest {
    /// Normalized subscription ID to cancel
    pub sid: String,
}

/// Response for Unsubscribe operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsubscribeResponse {
    /// The renderer answered 412: the subscription was already gone
    pub already_expired: bool,
}

impl UnsubscribeOperation {
    /// Execute an unsubscribe request against an event URL
    pub fn execute(
        soap_client: &soap_client::SoapClient,
        event_url: &str,
        request: &UnsubscribeRequest,
    ) -> Result<UnsubscribeResponse> {
        match soap_client.unsubscribe(event_url, &wire_sid(&request.sid))? {
            200 => Ok(UnsubscribeResponse {
                already_expired: false,
            }),
            PRECONDITION_FAILED => Ok(UnsubscribeResponse {
                already_expired: true,
            }),
            status => Err(ApiError::HttpStatus(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsubscribe(status: usize) -> Result<UnsubscribeResponse> {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("UNSUBSCRIBE", "/evt")
            .match_header("SID", "uuid:4d2f-11")
            .with_status(status)
            .create();

        let client = soap_client::SoapClient::new();
        let request = UnsubscribeRequest {
            sid: "4d2f-11".to_string(),
        };
        UnsubscribeOperation::execute(&client, &format!("{}/evt", server.url()), &request)
    }

    #[test]
    fn test_unsubscribe_ok() {
        assert_eq!(
            unsubscribe(200).unwrap(),
            UnsubscribeResponse {
                already_expired: false
            }
        );
    }

    #[test]
    fn test_unsubscribe_precondition_failed_tolerated() {
        assert!(unsubscribe(412).unwrap().already_expired);
    }

    #[test]
    fn test_unsubscribe_server_error() {
        assert!(matches!(unsubscribe(500), Err(ApiError::HttpStatus(500))));
    }
}
