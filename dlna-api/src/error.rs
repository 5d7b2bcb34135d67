use soap_client::SoapError;
use thiserror::Error;

/// High-level API errors for media renderer operations
///
/// This enum abstracts away the underlying SOAP/GENA transport details and
/// provides meaningful error information for the failure modes seen when
/// controlling DLNA renderers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection timeouts, DNS resolution failures, or the renderer being
    /// unreachable.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The renderer answered with an unexpected HTTP status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Response or document parsing error
    ///
    /// Covers malformed device descriptions, malformed NOTIFY bodies and
    /// unexpected SOAP response shapes.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by the renderer
    #[error("SOAP fault: error code {0}")]
    SoapFault(u16),

    /// Envelope serialization failed
    ///
    /// Fatal to the action being built; never retried.
    #[error("Failed to marshal SOAP envelope: {0}")]
    MarshalError(String),

    /// The device description does not advertise an AVTransport service
    #[error("Incompatible device: {0}")]
    IncompatibleDevice(String),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// GENA subscription operation failed
    #[error("Subscription error: {0}")]
    SubscriptionError(String),
}

impl ApiError {
    /// Whether this error came from the transport rather than the renderer
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Status(code) => ApiError::HttpStatus(code),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
        }
    }
}

pub(crate) fn marshal_error(error: impl std::fmt::Display) -> ApiError {
    ApiError::MarshalError(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_error_conversion() {
        let api_error: ApiError = SoapError::Network("connection timeout".to_string()).into();
        assert!(matches!(api_error, ApiError::NetworkError(_)));
        assert!(api_error.is_transport());

        let api_error: ApiError = SoapError::Parse("invalid XML".to_string()).into();
        assert!(matches!(api_error, ApiError::ParseError(_)));

        let api_error: ApiError = SoapError::Fault(701).into();
        assert!(matches!(api_error, ApiError::SoapFault(701)));

        let api_error: ApiError = SoapError::Status(412).into();
        assert!(matches!(api_error, ApiError::HttpStatus(412)));
        assert!(!api_error.is_transport());
    }

    #[test]
    fn test_error_display() {
        let network_err = ApiError::NetworkError("connection failed".to_string());
        assert_eq!(format!("{}", network_err), "Network error: connection failed");

        let incompatible = ApiError::IncompatibleDevice("no AVTransport".to_string());
        assert_eq!(format!("{}", incompatible), "Incompatible device: no AVTransport");

        let soap_fault = ApiError::SoapFault(500);
        assert_eq!(format!("{}", soap_fault), "SOAP fault: error code 500");
    }
}
