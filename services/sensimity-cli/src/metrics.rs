//! Prometheus rendering of the client's counters
//!
//! The fetch is a one-shot process, so there is no `/metrics` endpoint. With
//! `--metrics` the recorder is installed up front and the text exposition is
//! written to stderr once the request has finished.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")
}
