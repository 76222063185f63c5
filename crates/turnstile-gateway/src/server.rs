// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use turnstile_config::model::GatewayConfig;
use turnstile_core::TurnstileError;
use turnstile_queue::QueueService;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;
use crate::ws;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Prometheus render function; `/metrics` answers 404 without one.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub queue: Arc<QueueService>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Bind address of the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Assemble the full route table.
///
/// - public: `POST /api/tickets`, `GET /api/tickets/{id}`, `/health`, `/metrics`
/// - bearer: `GET /api/tickets`, `GET /api/tickets/in-progress`, and the agent
///   routes `POST /api/tickets/call-next`, `POST /api/tickets/{id}/redirect`
/// - WebSocket: `/ws/ahead`, `/ws/tickets/{id}`, `/ws/in-progress`
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .route("/api/tickets", post(handlers::post_ticket))
        .route("/api/tickets/{id}", get(handlers::get_ticket))
        .with_state(state.clone());

    let staff_routes = Router::new()
        .route("/api/tickets", get(handlers::list_tickets))
        .route("/api/tickets/in-progress", get(handlers::list_in_progress))
        .route("/api/tickets/call-next", post(handlers::call_next))
        .route("/api/tickets/{id}/redirect", post(handlers::redirect))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws/ahead", get(ws::ahead))
        .route("/ws/tickets/{id}", get(ws::ticket))
        .route("/ws/in-progress", get(ws::in_progress))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the gateway until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), TurnstileError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TurnstileError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| TurnstileError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
