//! Credential lifecycle facade
//!
//! `AuthService` combines the credential store and the token refresher. It is
//! built once and shared by `Arc` between every request pipeline.
//!
//! Refreshes are single-flight: a `tokio::sync::Mutex` admits one refresh at a
//! time, and a generation counter tells a caller whether somebody else
//! finished a refresh while it was waiting. If so the caller adopts that
//! outcome (the fresh token, or the same error) instead of rotating the
//! refresh token again underneath its siblings.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::token::TokenRefresher;

/// Outcome of the most recent completed refresh.
#[derive(Default)]
struct RefreshSlot {
    generation: u64,
    last_outcome: Option<Result<()>>,
}

pub struct AuthService {
    store: CredentialStore,
    refresher: TokenRefresher,
    slot: Mutex<RefreshSlot>,
    /// Mirror of `slot.generation` readable without the lock.
    generation: AtomicU64,
}

impl AuthService {
    pub fn new(store: CredentialStore, refresher: TokenRefresher) -> Self {
        Self {
            store,
            refresher,
            slot: Mutex::new(RefreshSlot::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// True iff an access token is stored and not yet due for refresh.
    pub async fn is_authorized(&self) -> Result<bool> {
        Ok(self.authorized_token().await?.is_some())
    }

    pub async fn should_refresh(&self) -> Result<bool> {
        self.store.should_refresh().await
    }

    /// The stored access token.
    ///
    /// Fails with a state error when none exists; check `is_authorized` first
    /// or call right after a successful refresh.
    pub async fn access_token(&self) -> Result<String> {
        self.store
            .access_token()
            .await?
            .ok_or_else(Error::no_credential)
    }

    /// The access token, read from the same snapshot as its expiry, if it is
    /// currently valid.
    pub async fn authorized_token(&self) -> Result<Option<String>> {
        let credential = self.store.credential().await?;
        if credential.is_valid(self.store.now_millis()) {
            Ok(credential.access_token)
        } else {
            Ok(None)
        }
    }

    /// Acquire a new access token.
    ///
    /// Clears the current token and expiry first, then runs the appropriate
    /// grant. Callers that arrive while another refresh is in flight wait for
    /// it and share its outcome.
    pub async fn refresh(&self) -> Result<()> {
        let observed = self.generation.load(Ordering::Acquire);
        self.refresh_after(observed).await
    }

    /// Refresh only if the credential is due, coalescing with any refresh
    /// already in flight.
    pub async fn refresh_if_stale(&self) -> Result<()> {
        // Load the generation before checking staleness: a refresh finishing
        // between the two steps then shows up as a generation change.
        let observed = self.generation.load(Ordering::Acquire);
        if !self.store.should_refresh().await? {
            return Ok(());
        }
        self.refresh_after(observed).await
    }

    async fn refresh_after(&self, observed: u64) -> Result<()> {
        let mut slot = self.slot.lock().await;

        if slot.generation != observed {
            if let Some(outcome) = &slot.last_outcome {
                debug!(generation = slot.generation, "adopting outcome of concurrent refresh");
                return outcome.clone();
            }
        }

        let outcome = self.run_refresh().await;
        slot.generation += 1;
        slot.last_outcome = Some(outcome.clone());
        self.generation.store(slot.generation, Ordering::Release);
        outcome
    }

    async fn run_refresh(&self) -> Result<()> {
        // Never leave a stale-but-unexpired token visible if the refresh dies halfway.
        self.store.clear_access_token().await?;
        self.refresher.refresh(&self.store).await?;
        info!("credential refreshed");
        Ok(())
    }
}
