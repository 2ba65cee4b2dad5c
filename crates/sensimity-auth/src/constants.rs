//! Sensimity API constants
//!
//! The client id/secret and user credentials are not here: they are supplied
//! by the embedding application through `ClientCredentials`.

/// Production API root. The token endpoint and resources hang off this.
pub const SENSIMITY_URL: &str = "https://api.sensimity.com";

/// Token endpoint path, relative to the API root.
pub const TOKEN_PATH: &str = "/oauth";

/// Versioned media type used for `Accept` on every request, token calls included.
pub const MEDIA_TYPE: &str = "application/vnd.sensimity.v1+json";

/// Key-value store keys for the persisted credential.
pub const TOKEN_KEY: &str = "token";
pub const EXPIRES_AT_KEY: &str = "expires_at";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Counter of token endpoint calls, labelled by `grant` and `outcome`.
pub const TOKEN_REQUESTS_METRIC: &str = "sensimity_token_requests_total";

/// Build the token endpoint URL for an API root, tolerating a trailing slash.
pub fn token_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH)
}
