//! Private SOAP client for UPnP media renderer communication
//!
//! This crate provides the blocking HTTP transport used to talk to DLNA
//! media renderers: SOAP action POSTs against a service control URL, the
//! GENA `SUBSCRIBE`/`UNSUBSCRIBE` verbs against an event URL, and a plain
//! GET for device description documents. Envelope construction lives in
//! `dlna-api`; this crate only moves bytes and decodes SOAP faults.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::Element;

/// Timeouts applied to every request issued by a [`SoapClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum time to establish the TCP connection
    pub connect_timeout: Duration,
    /// Maximum time to wait for response data
    pub read_timeout: Duration,
    /// Maximum time to send the request body
    pub write_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Raw answer to a GENA `SUBSCRIBE` request
///
/// Non-success statuses are reported here rather than as errors: how to treat
/// a refused subscription is a policy decision of the caller.
#[derive(Debug, Clone)]
pub struct GenaResponse {
    /// HTTP status code returned by the renderer
    pub status: u16,
    /// Raw `SID` header, if present
    pub sid: Option<String>,
    /// Raw `TIMEOUT` header (e.g. `Second-300`), if present
    pub timeout: Option<String>,
}

impl GenaResponse {
    /// Whether the renderer accepted the request with `200 OK`
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// A minimal SOAP client for UPnP media renderer communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default timeouts
    pub fn new() -> Self {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a SOAP client with explicit timeouts
    pub fn with_config(config: &ClientConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout_read(config.read_timeout)
                .timeout_write(config.write_timeout)
                .build(),
        }
    }

    /// POST a serialized SOAP envelope and return the `<{action}Response>` element
    ///
    /// # Arguments
    /// * `control_url` - Absolute control URL of the target service
    /// * `service_uri` - Service type URN, used for the `SOAPAction` header
    /// * `action` - UPnP action name (e.g. `Play`)
    /// * `envelope` - Complete envelope bytes, XML declaration included
    pub fn call(
        &self,
        control_url: &str,
        service_uri: &str,
        action: &str,
        envelope: &[u8],
    ) -> Result<Element, SoapError> {
        let soap_action = format!("\"{}#{}\"", service_uri, action);
        tracing::debug!(url = control_url, action, "sending SOAP action");

        let response = match self
            .agent
            .post(control_url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPAction", &soap_action)
            .send_bytes(envelope)
        {
            Ok(response) => response,
            // Renderers deliver SOAP faults with HTTP 500
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(match Element::parse(body.as_bytes()) {
                    Ok(xml) => match Self::extract_fault(&xml) {
                        Some(fault) => fault,
                        None => SoapError::Status(code),
                    },
                    Err(_) => SoapError::Status(code),
                });
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml_text = response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        self.extract_response(&xml, action)
    }

    /// Fetch a document (typically a device description) with a plain GET
    pub fn fetch(&self, url: &str) -> Result<String, SoapError> {
        let response = self.agent.get(url).call().map_err(Self::map_error)?;
        response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))
    }

    /// Open a new GENA subscription
    ///
    /// Sends `SUBSCRIBE` with `CALLBACK`, `NT: upnp:event` and the requested
    /// `TIMEOUT`.
    pub fn subscribe(
        &self,
        event_url: &str,
        callback_url: &str,
        timeout_seconds: u32,
    ) -> Result<GenaResponse, SoapError> {
        tracing::debug!(url = event_url, callback = callback_url, "sending SUBSCRIBE");
        let request = self
            .agent
            .request("SUBSCRIBE", event_url)
            .set("CALLBACK", &format!("<{}>", callback_url))
            .set("NT", "upnp:event")
            .set("TIMEOUT", &format!("Second-{}", timeout_seconds));

        Self::gena_response(request.call())
    }

    /// Renew an existing GENA subscription
    ///
    /// Sends `SUBSCRIBE` with `SID` and `TIMEOUT` only; `CALLBACK` and `NT`
    /// must not be present on a renewal.
    pub fn renew_subscription(
        &self,
        event_url: &str,
        sid: &str,
        timeout_seconds: u32,
    ) -> Result<GenaResponse, SoapError> {
        tracing::debug!(url = event_url, sid, "sending SUBSCRIBE renewal");
        let request = self
            .agent
            .request("SUBSCRIBE", event_url)
            .set("SID", sid)
            .set("TIMEOUT", &format!("Second-{}", timeout_seconds));

        Self::gena_response(request.call())
    }

    /// Cancel a GENA subscription, returning the HTTP status of the answer
    pub fn unsubscribe(&self, event_url: &str, sid: &str) -> Result<u16, SoapError> {
        tracing::debug!(url = event_url, sid, "sending UNSUBSCRIBE");
        match self
            .agent
            .request("UNSUBSCRIBE", event_url)
            .set("SID", sid)
            .call()
        {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(e) => Err(SoapError::Network(e.to_string())),
        }
    }

    fn gena_response(
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<GenaResponse, SoapError> {
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        Ok(GenaResponse {
            status: response.status(),
            sid: response.header("SID").map(str::to_string),
            timeout: response.header("TIMEOUT").map(str::to_string),
        })
    }

    fn map_error(error: ureq::Error) -> SoapError {
        match error {
            ureq::Error::Status(code, _) => SoapError::Status(code),
            other => SoapError::Network(other.to_string()),
        }
    }

    fn extract_fault(xml: &Element) -> Option<SoapError> {
        let fault = xml.get_child("Body")?.get_child("Fault")?;
        let error_code = fault
            .get_child("detail")
            .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")))
            .and_then(|e| e.get_child("errorCode"))
            .and_then(|c| c.get_text())
            .and_then(|t| t.trim().parse::<u16>().ok())
            .unwrap_or(500);
        Some(SoapError::Fault(error_code))
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        if let Some(fault) = Self::extract_fault(xml) {
            return Err(fault);
        }

        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}
