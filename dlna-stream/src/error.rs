//! Error types for the dlna-stream crate.

use dlna_api::ApiError;

/// Errors from the renderer state store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The sid is not (or no longer) a member of the store
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(String),
}

/// Errors from subscription management.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// The renderer or the transport failed the request
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The local bookkeeping has no record of the subscription
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The renewal timer for a granted subscription could not be started
    #[error("Failed to start renewal for {sid}: {source}")]
    Renewal {
        sid: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for subscription results.
pub type Result<T> = std::result::Result<T, SubscriptionError>;
