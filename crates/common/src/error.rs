//! Errors from reading `sensimity.toml` and resolving the secrets it points at

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A value was present but unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Neither the env var nor a `*_file` entry supplied the secret.
    #[error("{name} missing: set {env_key} or {name}_file")]
    MissingSecret {
        name: &'static str,
        env_key: &'static str,
    },

    /// The `*_file` entry named a file that could not be used.
    #[error("{name}_file {}: {reason}", path.display())]
    SecretFile {
        name: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
