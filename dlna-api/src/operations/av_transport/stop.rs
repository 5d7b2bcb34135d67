//! Stop operation for AVTransport service

use xmltree::Element;

use crate::envelope::SoapEnvelopeBuilder;
use crate::operation::INSTANCE_ID;
use crate::{Result, Service, UpnpOperation};

/// Stop operation
pub struct StopOperation;

/// Request for stop operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopRequest;

impl UpnpOperation for StopOperation {
    type Request = StopRequest;
    type Response = ();

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "Stop";

    fn build_envelope(_request: &Self::Request) -> Result<Vec<u8>> {
        SoapEnvelopeBuilder::new(Self::SERVICE, Self::ACTION)
            .argument("InstanceID", INSTANCE_ID)
            .build()
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response> {
        Ok(())
    }
}
