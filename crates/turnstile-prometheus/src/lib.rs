// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus exporter for Turnstile.
//!
//! The crates record through the `metrics` facade; this crate installs the
//! Prometheus recorder and renders the text format served at `/metrics`.

pub mod recording;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use turnstile_core::TurnstileError;

pub use recording::register_metrics;

/// Installed Prometheus recorder.
pub struct PrometheusExporter {
    handle: PrometheusHandle,
}

impl PrometheusExporter {
    /// Install the recorder globally and describe every metric.
    ///
    /// Only one recorder can be installed per process.
    pub fn install() -> Result<Self, TurnstileError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            TurnstileError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
