//! Error types for credential lifecycle operations

/// Errors from credential storage, token requests and refresh coordination.
///
/// `Clone` so a single refresh outcome can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An operation needed a credential that does not exist.
    #[error("credential state error: {0}")]
    State(String),

    /// The token endpoint refused or failed the request for a reason other
    /// than an invalid grant. Recoverable.
    #[error("token request failed: {0}")]
    Protocol(String),

    /// The server rejected the grant (refresh token invalid). The stored
    /// credential has been wiped by the time this is returned.
    #[error("grant rejected: {0}")]
    InvalidGrant(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("credential storage error: {0}")]
    Storage(String),
}

impl Error {
    /// The state error returned when no access token is stored.
    pub fn no_credential() -> Self {
        Error::State("no credential available".into())
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
