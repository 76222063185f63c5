// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `turnstile serve`: wire storage, hub, queue service and gateway together.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use turnstile_config::TurnstileConfig;
use turnstile_core::{SystemClock, TicketStore, TurnstileError};
use turnstile_gateway::auth::AuthConfig;
use turnstile_gateway::{GatewayState, HealthState, ServerConfig, start_server};
use turnstile_hub::NotificationHub;
use turnstile_prometheus::PrometheusExporter;
use turnstile_queue::QueueService;
use turnstile_storage::SqliteTicketStore;

use crate::shutdown;

type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// Run the server until SIGINT/SIGTERM.
pub async fn run_serve(config: TurnstileConfig) -> Result<(), TurnstileError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting turnstile serve");

    let store = SqliteTicketStore::new(config.storage.clone(), &config.queue);
    store.initialize().await?;
    if config.directory.is_empty() {
        debug!("no [directory] in configuration, using the stored directory");
    } else {
        store.sync_directory(config.directory.to_directory()).await?;
        info!(
            departments = config.directory.departments.len(),
            services = config.directory.services.len(),
            counters = config.directory.counters.len(),
            "directory synced from configuration"
        );
    }
    let store = Arc::new(store);

    let prometheus_render: Option<MetricsRender> =
        if config.prometheus.enabled {
            match PrometheusExporter::install() {
                Ok(exporter) => {
                    info!("prometheus metrics enabled");
                    Some(Arc::new(move || exporter.render()) as MetricsRender)
                }
                Err(e) => {
                    warn!(error = %e, "prometheus initialization failed, continuing without metrics");
                    None
                }
            }
        } else {
            debug!("prometheus metrics disabled by configuration");
            None
        };

    let hub = NotificationHub::new(&config.hub);
    let queue = Arc::new(QueueService::new(
        store.clone(),
        hub,
        Arc::new(SystemClock),
        &config.queue,
    ));

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set, staff and agent routes will reject every request");
    }

    let state = GatewayState {
        queue,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState {
            start_time: Instant::now(),
            prometheus_render,
        },
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&ServerConfig::from(&config.gateway), state, cancel).await;

    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close store cleanly");
    }
    served?;

    info!("turnstile serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("turnstile={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
