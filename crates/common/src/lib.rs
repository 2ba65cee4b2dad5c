//! Shared types for the Sensimity client workspace
//!
//! Holds the pieces every member needs: the redacting `Secret` wrapper used for
//! client secrets and passwords, and the configuration error type.

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
