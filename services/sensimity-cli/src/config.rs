//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret and password are loaded from SENSIMITY_CLIENT_SECRET /
//! SENSIMITY_PASSWORD or from the `*_file` paths, never stored in the TOML
//! directly to avoid leaking secrets.

use common::Secret;
use sensimity_auth::{ClientCredentials, RetryPolicy, SENSIMITY_URL};
use sensimity_client::ClientSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CLIENT_SECRET_ENV: &str = "SENSIMITY_CLIENT_SECRET";
const PASSWORD_ENV: &str = "SENSIMITY_PASSWORD";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    pub client: ClientConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// API endpoint settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// OAuth client and user identity
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub username: String,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default)]
    pub password_file: Option<PathBuf>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    #[serde(skip)]
    pub password: Option<Secret<String>>,
}

/// Where the credential file lives
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

/// Refresh retry policy
#[derive(Debug, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_invalid_grant")]
    pub retry_invalid_grant: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_invalid_grant: default_retry_invalid_grant(),
        }
    }
}

fn default_base_url() -> String {
    SENSIMITY_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    RetryPolicy::default().max_attempts
}

fn default_retry_invalid_grant() -> bool {
    RetryPolicy::default().retry_invalid_grant
}

impl Config {
    /// Load configuration from a TOML file, then resolve secrets.
    ///
    /// Secret resolution order, per secret:
    /// 1. env var (SENSIMITY_CLIENT_SECRET / SENSIMITY_PASSWORD)
    /// 2. `client_secret_file` / `password_file` path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        let base_url = &config.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if config.retry.max_attempts == 0 {
            return Err(common::Error::Config(
                "max_attempts must be at least 1".into(),
            ));
        }

        if config.client.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }

        config.client.client_secret = Some(resolve_secret(
            CLIENT_SECRET_ENV,
            config.client.client_secret_file.as_deref(),
            "client_secret",
        )?);
        config.client.password = Some(resolve_secret(
            PASSWORD_ENV,
            config.client.password_file.as_deref(),
            "password",
        )?);

        Ok(config)
    }

    /// Resolve config file path from CLI arg or SENSIMITY_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("SENSIMITY_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("sensimity.toml")
    }

    /// Client settings for `SensimityClient`.
    pub fn client_settings(&self) -> common::Result<ClientSettings> {
        let missing = |name: &str| common::Error::Config(format!("{name} was not resolved"));
        let credentials = ClientCredentials {
            client_id: self.client.client_id.clone(),
            client_secret: self
                .client
                .client_secret
                .clone()
                .ok_or_else(|| missing("client_secret"))?,
            username: self.client.username.clone(),
            password: self.client.password.clone().ok_or_else(|| missing("password"))?,
        };
        Ok(ClientSettings {
            base_url: self.api.base_url.clone(),
            credentials,
            timeout: Duration::from_secs(self.api.timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                retry_invalid_grant: self.retry.retry_invalid_grant,
            },
        })
    }
}

/// Env var wins over file. Surrounding whitespace in files is trimmed.
fn resolve_secret(
    env_key: &'static str,
    file: Option<&Path>,
    name: &'static str,
) -> common::Result<Secret<String>> {
    if let Ok(value) = std::env::var(env_key) {
        if !value.is_empty() {
            return Ok(Secret::from(value));
        }
    }
    let Some(file) = file else {
        return Err(common::Error::MissingSecret { name, env_key });
    };
    let file_error = |reason: String| common::Error::SecretFile {
        name,
        path: file.to_path_buf(),
        reason,
    };
    let contents = std::fs::read_to_string(file).map_err(|e| file_error(e.to_string()))?;
    let secret = Secret::from(contents.trim());
    if secret.is_empty() {
        return Err(file_error("file is empty".into()));
    }
    Ok(secret)
}
