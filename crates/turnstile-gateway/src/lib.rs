// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for Turnstile.
//!
//! REST routes drive the [`QueueService`](turnstile_queue::QueueService);
//! WebSocket routes attach clients to notification hub topics. Identity is
//! asserted by an upstream gate: the gateway checks a shared bearer token
//! and trusts the `X-Agent-Id` header it forwards.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod ws;

pub use error::ApiError;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
