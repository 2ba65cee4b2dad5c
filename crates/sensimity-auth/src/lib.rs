//! Sensimity OAuth credential lifecycle
//!
//! Decides when the bearer credential is valid, acquires a new one through
//! the token endpoint (password or refresh-token grant), and persists the
//! result through a pluggable key-value store.
//!
//! Credential flow:
//! 1. Caller asks `AuthService::refresh_if_stale()` before each request
//! 2. Stale or missing → `CredentialStore::clear_access_token()`
//! 3. `TokenRefresher` picks the grant from the stored refresh token
//! 4. Success → `CredentialStore::save_access_token()` (+ refresh token)
//! 5. `invalid_request` → `CredentialStore::clear_all()`; next cycle uses the password grant
//! 6. Caller reads `AuthService::authorized_token()` and attaches it

pub mod clock;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod kv;
pub mod retry;
pub mod service;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use common::Secret;
pub use constants::*;
pub use credentials::{Credential, CredentialStore};
pub use error::{Error, Result};
pub use kv::{Edit, FileStore, KeyValueStore, MemoryStore};
pub use retry::RetryPolicy;
pub use service::AuthService;
pub use token::{ClientCredentials, Grant, TokenRefresher, TokenResponse};
