use soap_client::SoapClient;

use crate::device::DeviceCapabilities;
use crate::operation::{PendingAction, UpnpOperation};
use crate::operations::events::{
    RenewOperation, RenewRequest, RenewResponse, SubscribeOperation, SubscribeRequest,
    SubscribeResponse, UnsubscribeOperation, UnsubscribeRequest, UnsubscribeResponse,
};
use crate::Result;

/// A client for executing UPnP operations against a media renderer
///
/// This client bridges the stateless operation definitions and the actual
/// network requests. Renderers publish their own control and event URLs, so
/// every call takes the absolute URL taken from [`DeviceCapabilities`].
///
/// ```rust,no_run
/// use dlna_api::DlnaClient;
/// use dlna_api::operations::av_transport::{PlayOperation, PlayRequest};
///
/// let client = DlnaClient::new();
/// let caps = client.fetch_description("http://192.168.1.40:1400/desc.xml")?;
/// client.execute::<PlayOperation>(&caps.av_transport_control_url, &PlayRequest)?;
/// # Ok::<(), dlna_api::ApiError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DlnaClient {
    soap_client: SoapClient,
}

impl DlnaClient {
    pub fn new() -> Self {
        Self {
            soap_client: SoapClient::new(),
        }
    }

    /// Create a client with a custom SOAP client (e.g. different timeouts)
    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self { soap_client }
    }

    /// Execute an operation against a service control URL
    ///
    /// Builds the envelope, POSTs it and parses the response. Nothing is
    /// retried; a failed call is reported to the caller as-is.
    pub fn execute<Op: UpnpOperation>(
        &self,
        control_url: &str,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let action = PendingAction::new::<Op>(control_url, request)?;

        let xml = self
            .soap_client
            .call(&action.url, action.service_uri, action.action, &action.body)?;

        Op::parse_response(&xml)
    }

    /// Fetch and parse the device description at `location`
    pub fn fetch_description(&self, location: &str) -> Result<DeviceCapabilities> {
        let xml = self.soap_client.fetch(location)?;
        DeviceCapabilities::from_description(&xml, location)
    }

    /// Open a GENA subscription on `event_url`
    pub fn subscribe(
        &self,
        event_url: &str,
        callback_url: &str,
        timeout_seconds: u32,
    ) -> Result<SubscribeResponse> {
        let request = SubscribeRequest {
            callback_url: callback_url.to_string(),
            timeout_seconds,
        };
        SubscribeOperation::execute(&self.soap_client, event_url, &request)
    }

    /// Renew the subscription `sid` in place
    pub fn renew(&self, event_url: &str, sid: &str, timeout_seconds: u32) -> Result<RenewResponse> {
        let request = RenewRequest {
            sid: sid.to_string(),
            timeout_seconds,
        };
        RenewOperation::execute(&self.soap_client, event_url, &request)
    }

    /// Cancel the subscription `sid`
    pub fn unsubscribe(&self, event_url: &str, sid: &str) -> Result<UnsubscribeResponse> {
        let request = UnsubscribeRequest {
            sid: sid.to_string(),
        };
        UnsubscribeOperation::execute(&self.soap_client, event_url, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::av_transport::{PlayOperation, PlayRequest};
    use crate::operations::rendering_control::{GetVolumeOperation, GetVolumeRequest};
    use crate::ApiError;

    const VOLUME_RESPONSE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <u:GetVolumeResponse xmlns:u="urn:schemas-upnp-org:service:RenderingControl:1">
      <CurrentVolume>27</CurrentVolume>
    </u:GetVolumeResponse>
  </s:Body>
</s:Envelope>"#;

    const FAULT_RESPONSE: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>701</errorCode>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_execute_posts_envelope() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/rc")
            .match_header(
                "SOAPAction",
                "\"urn:schemas-upnp-org:service:RenderingControl:1#GetVolume\"",
            )
            .match_body(mockito::Matcher::Regex("<Channel>Master</Channel>".to_string()))
            .with_status(200)
            .with_body(VOLUME_RESPONSE)
            .create();

        let client = DlnaClient::new();
        let response = client
            .execute::<GetVolumeOperation>(&format!("{}/rc", server.url()), &GetVolumeRequest)
            .unwrap();

        mock.assert();
        assert_eq!(response.current_volume, 27);
    }

    #[test]
    fn test_execute_surfaces_fault() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/ctrl")
            .with_status(500)
            .with_body(FAULT_RESPONSE)
            .create();

        let client = DlnaClient::new();
        let result = client.execute::<PlayOperation>(&format!("{}/ctrl", server.url()), &PlayRequest);

        assert!(matches!(result, Err(ApiError::SoapFault(701))));
    }

    #[test]
    fn test_execute_transport_error() {
        let client = DlnaClient::new();
        let result = client.execute::<PlayOperation>("http://127.0.0.1:9/ctrl", &PlayRequest);

        assert!(matches!(result, Err(ApiError::NetworkError(_))));
    }

    #[test]
    fn test_fetch_description() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/desc.xml")
            .with_status(200)
            .with_body(
                r#"<root><device><friendlyName>TV</friendlyName><serviceList><service>
                <serviceId>urn:upnp-org:serviceId:AVTransport</serviceId>
                <controlURL>AVTransport/control</controlURL>
                <eventSubURL>AVTransport/event</eventSubURL>
                </service></serviceList></device></root>"#,
            )
            .create();

        let client = DlnaClient::new();
        let caps = client
            .fetch_description(&format!("{}/desc.xml", server.url()))
            .unwrap();

        assert_eq!(
            caps.av_transport_control_url,
            format!("{}/AVTransport/control", server.url())
        );
        assert_eq!(
            caps.av_transport_event_url,
            format!("{}/AVTransport/event", server.url())
        );
    }
}
