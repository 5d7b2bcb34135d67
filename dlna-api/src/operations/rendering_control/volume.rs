//! SetVolume and GetVolume operations for RenderingControl service

use xmltree::Element;

use crate::envelope::SoapEnvelopeBuilder;
use crate::operation::{child_text, INSTANCE_ID, MASTER_CHANNEL};
use crate::{ApiError, Result, Service, UpnpOperation};

/// Highest volume accepted by `SetVolume`
pub const MAX_VOLUME: u8 = 100;

/// SetVolume operation
pub struct SetVolumeOperation;

/// Request for SetVolume operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetVolumeRequest {
    pub desired_volume: u8,
}

impl UpnpOperation for SetVolumeOperation {
    type Request = SetVolumeRequest;
    type Response = ();

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "SetVolume";

    fn build_envelope(request: &Self::Request) -> Result<Vec<u8>> {
        if request.desired_volume > MAX_VOLUME {
            return Err(ApiError::InvalidParameter(format!(
                "volume {} is out of range (0..={})",
                request.desired_volume, MAX_VOLUME
            )));
        }

        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .argument("Channel", MASTER_CHANNEL)
            .argument("DesiredVolume", request.desired_volume.to_string())
            .build()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(())
    }
}

/// GetVolume operation
pub struct GetVolumeOperation;

/// Request for GetVolume operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetVolumeRequest;

/// Response for GetVolume operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetVolumeResponse {
    pub current_volume: u8,
}

impl UpnpOperation for GetVolumeOperation {
    type Request = GetVolumeRequest;
    type Response = GetVolumeResponse;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "GetVolume";

    fn build_envelope(_request: &Self::Request) -> Result<Vec<u8>> {
        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .argument("Channel", MASTER_CHANNEL)
            .build()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response> {
        let text = child_text(xml, "CurrentVolume")
            .ok_or_else(|| ApiError::ParseError("Missing CurrentVolume element".to_string()))?;

        let current_volume = text
            .parse::<u8>()
            .map_err(|e| ApiError::ParseError(format!("Invalid CurrentVolume value: {}", e)))?;

        Ok(GetVolumeResponse { current_volume })
    }
}
