//! Play operation for AVTransport service

use xmltree::Element;

use crate::envelope::SoapEnvelopeBuilder;
use crate::operation::{INSTANCE_ID, PLAY_SPEED};
use crate::{Result, Service, UpnpOperation};

/// Play operation
pub struct PlayOperation;

/// Request for play operation; instance and speed are fixed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayRequest;

impl UpnpOperation for PlayOperation {
    type Request = PlayRequest;
    type Response = ();

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "Play";

    fn build_envelope(_request: &Self::Request) -> Result<Vec<u8>> {
        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .argument("Speed", PLAY_SPEED)
            .build()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(())
    }
}
