use dlna_api::ApiError;
use dlna_stream::{StoreError, SubscriptionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("No media loaded")]
    NoMediaLoaded,

    #[error("Renderer has no RenderingControl service")]
    RenderingControlUnavailable,
}

pub type Result<T> = std::result::Result<T, CastError>;
