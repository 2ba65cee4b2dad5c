//! Per-request credential middleware
//!
//! Every outgoing request passes through `RequestInterceptor::execute`:
//! 1. `refresh_if_stale()` on the shared `AuthService`; failures are retried
//!    as the `RetryPolicy` allows, then abort the request
//! 2. If authorized, attach `Accept` + `Authorization: Bearer` and forward
//! 3. Otherwise fail with a state error; nothing reaches the network
//!
//! The response is returned as the transport produced it. A non-2xx status
//! from the API is the caller's business, not an interceptor error.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response};
use sensimity_auth::{AuthService, MEDIA_TYPE, RetryPolicy};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

/// Sends an already-authorized request.
///
/// Uses `Pin<Box<dyn Future>>` so the interceptor can hold an `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + '_>>;
}

impl Transport for reqwest::Client {
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + '_>> {
        Box::pin(async move {
            self.execute(request)
                .await
                .map_err(|e| Error::Transport(e.to_string()))
        })
    }
}

pub struct RequestInterceptor {
    auth: Arc<AuthService>,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RequestInterceptor {
    pub fn new(
        auth: Arc<AuthService>,
        transport: Arc<dyn Transport>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            auth,
            transport,
            policy,
        }
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Make the shared credential fresh, refreshing at most
    /// `policy.max_attempts` times.
    pub async fn ensure_fresh(&self) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.auth.refresh_if_stale().await {
                Ok(()) => return Ok(()),
                Err(e) if self.policy.should_retry(attempt, &e) => {
                    warn!(attempt, error = %e, "credential refresh failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "credential refresh failed, aborting request");
                    return Err(e.into());
                }
            }
        }
    }

    /// Attach `Accept` and `Authorization: Bearer` to `request`, replacing any
    /// caller-supplied values.
    ///
    /// Fails with a state error when no valid credential is stored.
    pub async fn authorize(&self, request: &mut Request) -> Result<()> {
        let token = self.auth.authorized_token().await?.ok_or_else(|| {
            sensimity_auth::Error::State("no bearer token available for request".into())
        })?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::InvalidHeader(format!("access token: {e}")))?;
        bearer.set_sensitive(true);

        let headers = request.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(AUTHORIZATION, bearer);
        Ok(())
    }

    /// Send `request` with a valid credential attached.
    #[instrument(skip_all, fields(method = %request.method(), path = %request.url().path()))]
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        self.ensure_fresh().await?;
        self.authorize(&mut request).await?;

        let response = self.transport.send(request).await?;
        debug!(status = response.status().as_u16(), "request completed");
        Ok(response)
    }
}
