//! Authenticated HTTP access to the Sensimity API
//!
//! `RequestInterceptor` sits in front of the transport: before each request it
//! makes sure the shared credential is fresh (refreshing with a bounded retry
//! policy), then attaches `Accept` and `Authorization: Bearer` headers and
//! forwards. `SensimityClient` wires the interceptor, the auth service and a
//! reqwest client together from plain settings.

pub mod client;
pub mod error;
pub mod interceptor;

pub use client::{ClientSettings, SensimityClient};
pub use error::{Error, Result};
pub use interceptor::{RequestInterceptor, Transport};
