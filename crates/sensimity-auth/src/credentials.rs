//! Credential storage for the Sensimity OAuth tokens
//!
//! Maps the credential triple (access token, refresh token, expiry) onto three
//! keys of an external `KeyValueStore`. Token and expiry are always written or
//! removed in one batch so no reader sees a token next to a stale expiry.
//!
//! `expires_at` is a unix timestamp in milliseconds (absolute, not a delta),
//! computed at save time from the token response's `expires_in` plus now.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::constants::{EXPIRES_AT_KEY, REFRESH_TOKEN_KEY, TOKEN_KEY};
use crate::error::Result;
use crate::kv::{Edit, KeyValueStore};

const CREDENTIAL_KEYS: [&str; 3] = [TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY];

/// Snapshot of the persisted credential.
///
/// `expires_at` is `None` when no expiry was ever stored. That state is always
/// due for refresh, same as an instant at or before now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<u64>,
}

impl Credential {
    /// Whether a new access token must be acquired at `now_millis`.
    ///
    /// An absent token needs acquisition whatever the stored expiry says.
    pub fn needs_refresh(&self, now_millis: u64) -> bool {
        if self.access_token.is_none() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => expires_at <= now_millis,
            None => true,
        }
    }

    pub fn is_valid(&self, now_millis: u64) -> bool {
        !self.needs_refresh(now_millis)
    }
}

/// Reads and writes the credential through a key-value backend.
///
/// Cheap to clone; clones share the backend and clock.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Read the whole credential from one snapshot.
    pub async fn credential(&self) -> Result<Credential> {
        let values = self.kv.read(&CREDENTIAL_KEYS).await?;
        let mut values = values.into_iter();
        let access_token = values.next().flatten();
        let refresh_token = values.next().flatten().filter(|rt| !rt.is_empty());
        let expires_at = match values.next().flatten() {
            Some(raw) if access_token.is_some() => parse_millis(&raw),
            _ => None,
        };
        Ok(Credential {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.credential().await?.access_token)
    }

    /// Stored refresh token, or an empty string if there is none.
    pub async fn refresh_token(&self) -> Result<String> {
        Ok(self.credential().await?.refresh_token.unwrap_or_default())
    }

    /// Stored expiry in unix milliseconds. `None` when no token is stored.
    pub async fn expires_at(&self) -> Result<Option<u64>> {
        Ok(self.credential().await?.expires_at)
    }

    /// Persist an access token valid for `ttl` from now, together with its expiry.
    pub async fn save_access_token(&self, token: &str, ttl: Duration) -> Result<()> {
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at = self.now_millis().saturating_add(ttl_millis);
        self.kv
            .apply(vec![
                Edit::put(TOKEN_KEY, token),
                Edit::put(EXPIRES_AT_KEY, expires_at.to_string()),
            ])
            .await?;
        debug!(expires_at, "saved access token");
        Ok(())
    }

    pub async fn save_refresh_token(&self, token: &str) -> Result<()> {
        self.kv.apply(vec![Edit::put(REFRESH_TOKEN_KEY, token)]).await?;
        debug!("saved refresh token");
        Ok(())
    }

    /// Drop the access token and its expiry, keeping the refresh token.
    pub async fn clear_access_token(&self) -> Result<()> {
        self.kv
            .apply(vec![Edit::remove(TOKEN_KEY), Edit::remove(EXPIRES_AT_KEY)])
            .await
    }

    /// Remove every persisted field.
    pub async fn clear_all(&self) -> Result<()> {
        self.kv.apply(vec![Edit::Clear]).await?;
        debug!("cleared all credential state");
        Ok(())
    }

    /// True iff the stored credential is missing or its expiry is at or before now.
    pub async fn should_refresh(&self) -> Result<bool> {
        let credential = self.credential().await?;
        Ok(credential.needs_refresh(self.now_millis()))
    }
}

/// An unreadable expiry counts as never stored, so the token is due and the
/// next refresh overwrites the pair.
fn parse_millis(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(millis) => Some(millis),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable {EXPIRES_AT_KEY} value");
            None
        }
    }
}
