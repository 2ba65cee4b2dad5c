//! Client wiring
//!
//! Builds the object graph once: reqwest client → `TokenRefresher` →
//! `AuthService` → `RequestInterceptor`. Everything is injected, so tests and
//! embedders can swap the key-value store or the clock.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response};
use sensimity_auth::{
    AuthService, ClientCredentials, Clock, CredentialStore, KeyValueStore, RetryPolicy,
    SENSIMITY_URL, SystemClock, TokenRefresher,
};
use tracing::info;

use crate::error::{Error, Result};
use crate::interceptor::RequestInterceptor;

/// Default per-request timeout (token calls included).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to talk to the API, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub credentials: ClientCredentials,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientSettings {
    /// Production API root, default timeout and retry policy.
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            base_url: SENSIMITY_URL.to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct SensimityClient {
    base_url: String,
    http: reqwest::Client,
    interceptor: RequestInterceptor,
}

impl SensimityClient {
    /// Wire a client on the wall clock.
    pub fn new(settings: ClientSettings, kv: Arc<dyn KeyValueStore>) -> Result<Self> {
        Self::with_clock(settings, kv, Arc::new(SystemClock))
    }

    pub fn with_clock(
        settings: ClientSettings,
        kv: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Transport(format!("building HTTP client: {e}")))?;

        let base_url = settings.base_url.trim_end_matches('/').to_string();
        let refresher =
            TokenRefresher::new(http.clone(), &base_url, Arc::new(settings.credentials));
        let auth = Arc::new(AuthService::new(CredentialStore::new(kv, clock), refresher));
        let interceptor = RequestInterceptor::new(auth, Arc::new(http.clone()), settings.retry);

        info!(
            base_url = %base_url,
            max_attempts = settings.retry.max_attempts,
            "sensimity client ready"
        );
        Ok(Self {
            base_url,
            http,
            interceptor,
        })
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        self.interceptor.auth()
    }

    pub fn interceptor(&self) -> &RequestInterceptor {
        &self.interceptor
    }

    /// Authenticated `GET <base_url><path>`.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(Method::GET, path).await
    }

    /// Authenticated request without a body.
    pub async fn send(&self, method: Method, path: &str) -> Result<Response> {
        let url = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        let request = self
            .http
            .request(method, &url)
            .build()
            .map_err(|e| Error::InvalidRequest(format!("{url}: {e}")))?;
        self.interceptor.execute(request).await
    }
}
