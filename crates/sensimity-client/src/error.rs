//! Error types for intercepted requests

/// Errors from sending a request through the interceptor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The credential could not be made valid; nothing was sent.
    #[error(transparent)]
    Auth(#[from] sensimity_auth::Error),

    /// The guarded request itself failed on the network.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
