// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Turnstile queue service.

use thiserror::Error;

/// The primary error type used across the store trait, the queue service and the gateway.
///
/// "Queue empty" is deliberately absent: an empty queue is a normal outcome of
/// calling next and is reported through `CallOutcome::QueueEmpty`.
#[derive(Debug, Error)]
pub enum TurnstileError {
    /// Storage backend errors (database connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Malformed or missing input, rejected before any mutation.
    #[error("{0}")]
    Validation(String),

    /// A referenced ticket, counter or service does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A concurrent assignment won the compare-and-set for this ticket.
    #[error("ticket {ticket} was assigned concurrently, retry the call")]
    Conflict { ticket: String },

    /// The caller did not present an identity the gateway accepts.
    #[error("authentication required")]
    Unauthorized,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TurnstileError {
    /// Shorthand for a [`TurnstileError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
