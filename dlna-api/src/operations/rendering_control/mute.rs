//! SetMute and GetMute operations for RenderingControl service

use xmltree::Element;

use crate::envelope::SoapEnvelopeBuilder;
use crate::operation::{child_text, INSTANCE_ID, MASTER_CHANNEL};
use crate::{ApiError, Result, Service, UpnpOperation};

/// SetMute operation
pub struct SetMuteOperation;

/// Request for SetMute operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetMuteRequest {
    pub desired_mute: bool,
}

impl UpnpOperation for SetMuteOperation {
    type Request = SetMuteRequest;
    type Response = ();

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "SetMute";

    fn build_envelope(request: &Self::Request) -> Result<Vec<u8>> {
        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .argument("Channel", MASTER_CHANNEL)
            .argument("DesiredMute", if request.desired_mute { "1" } else { "0" })
            .build()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(())
    }
}

/// GetMute operation
pub struct GetMuteOperation;

/// Request for GetMute operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetMuteRequest;

/// Response for GetMute operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetMuteResponse {
    pub current_mute: bool,
}

impl UpnpOperation for GetMuteOperation {
    type Request = GetMuteRequest;
    type Response = GetMuteResponse;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "GetMute";

    fn build_envelope(_request: &Self::Request) -> Result<Vec<u8>> {
        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .argument("Channel", MASTER_CHANNEL)
            .build()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let text = child_text(xml, "CurrentMute")
            .ok_or_else(|| ApiError::ParseError("Missing CurrentMute element".to_string()))?;

        let current_mute = match text.as_str() {
            "1" | "true" | "True" => true,
            "0" | "false" | "False" => false,
            other => {
                return Err(ApiError::ParseError(format!(
                    "Invalid CurrentMute value: {}",
                    other
                )))
            }
        };

        Ok(GetMuteResponse { current_mute })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mute_envelope() {
        let body = String::from_utf8(
            SetMuteOperation::build_envelope(&SetMuteRequest { desired_mute: true }).unwrap(),
        )
        .unwrap();

        assert!(body.contains("<u:SetMute xmlns:u=\"urn:schemas-upnp-org:service:RenderingControl:1\">"));
        assert!(body.contains("<Channel>Master</Channel>"));
        assert!(body.contains("<DesiredMute>1</DesiredMute>"));
    }

    #[test]
    fn test_unmute_envelope() {
        let body = String::from_utf8(
            SetMuteOperation::build_envelope(&SetMuteRequest { desired_mute: false }).unwrap(),
        )
        .unwrap();
        assert!(body.contains("<DesiredMute>0</DesiredMute>"));
    }

    #[test]
    fn test_get_mute_response_parsing() {
        let xml = Element::parse(
            r#"<GetMuteResponse><CurrentMute>1</CurrentMute></GetMuteResponse>"#.as_bytes(),
        )
        .unwrap();
        assert!(GetMuteOperation::parse_response(&xml).unwrap().current_mute);

        let xml = Element::parse(
            r#"<GetMuteResponse><CurrentMute>0</CurrentMute></GetMuteResponse>"#.as_bytes(),
        )
        .unwrap();
        assert!(!GetMuteOperation::parse_response(&xml).unwrap().current_mute);
    }

    #[test]
    fn test_get_mute_missing_value() {
        let xml = Element::parse(r#"<GetMuteResponse/>"#.as_bytes()).unwrap();
        assert!(matches!(
            GetMuteOperation::parse_response(&xml),
            Err(ApiError::ParseError(_))
        ));
    }
}
