// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the gateway.
//!
//! Staff routes require `Authorization: Bearer <token>` matching the
//! configured token. When no token is configured every staff request is
//! rejected (fail-closed). Agent routes additionally require the
//! `X-Agent-Id` header set by the upstream identity gate.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use turnstile_core::{AgentId, TurnstileError};

use crate::error::ApiError;

/// Header carrying the agent identity asserted by the upstream gate.
pub const AGENT_HEADER: &str = "x-agent-id";

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects all staff requests.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates the bearer token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured, rejecting request");
        return ApiError::from(TurnstileError::Unauthorized).into_response();
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented == Some(expected) {
        next.run(request).await
    } else {
        ApiError::from(TurnstileError::Unauthorized).into_response()
    }
}

/// The calling agent, taken from [`AGENT_HEADER`].
#[derive(Debug, Clone)]
pub struct Agent(pub AgentId);

impl<S: Send + Sync> FromRequestParts<S> for Agent {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AGENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Agent(AgentId::from(v)))
            .ok_or_else(|| {
                ApiError::status(StatusCode::UNAUTHORIZED, "agent identity required")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            bearer_token: Some("secret-token".to_string()),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }

    #[tokio::test]
    async fn agent_extractor_reads_header() {
        let request = axum::http::Request::builder()
            .header(AGENT_HEADER, " agent-7 ")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let Agent(agent) = Agent::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(agent.as_str(), "agent-7");
    }

    #[tokio::test]
    async fn agent_extractor_rejects_missing_header() {
        let request = axum::http::Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let rejection = Agent::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
