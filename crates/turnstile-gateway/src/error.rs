// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`TurnstileError`] to HTTP responses.
//!
//! Every error body has the shape `{"detail": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use turnstile_core::TurnstileError;

/// Error body returned by every route.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// A [`TurnstileError`] on its way out of a handler, or a bare status with a message.
#[derive(Debug)]
pub enum ApiError {
    Domain(TurnstileError),
    Status(StatusCode, String),
}

impl ApiError {
    pub fn status(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::Status(status, detail.into())
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, detail)
    }
}

impl From<TurnstileError> for ApiError {
    fn from(err: TurnstileError) -> Self {
        Self::Domain(err)
    }
}

fn status_for(err: &TurnstileError) -> StatusCode {
    match err {
        TurnstileError::Validation(_) => StatusCode::BAD_REQUEST,
        TurnstileError::NotFound { .. } => StatusCode::NOT_FOUND,
        TurnstileError::Conflict { .. } => StatusCode::CONFLICT,
        TurnstileError::Unauthorized => StatusCode::UNAUTHORIZED,
        TurnstileError::Storage { .. } | TurnstileError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Status(status, detail) => (status, detail),
            Self::Domain(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                    (status, "internal server error".to_string())
                } else {
                    (status, err.to_string())
                }
            }
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
