//! Pause operation for AVTransport service

use xmltree::Element;

use crate::envelope::SoapEnvelopeBuilder;
use crate::operation::INSTANCE_ID;
use crate::{Result, Service, UpnpOperation};

/// Pause operation
pub struct PauseOperation;

/// Request for pause operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseRequest;

impl UpnpOperation for PauseOperation {
    type Request = PauseRequest;
    type Response = ();

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "Pause";

    fn build_envelope(_request: &Self::Request) -> Result<Vec<u8>> {
        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .build()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(())
    }
}
