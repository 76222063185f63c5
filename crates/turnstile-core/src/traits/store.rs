// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::TurnstileError;
use crate::types::{
    AgentId, BoardSnapshot, CallRequest, Counter, CounterId, Directory, HealthStatus, Issued,
    NewTicket, Page, PageRequest, Service, ServiceId, Ticket, TicketFilter, TicketId, Transition,
};

/// Durable ticket store.
///
/// Every mutating method runs as a single atomic unit: either all of its
/// writes commit or none do. Implementations decide the waiting scope
/// (same business day only, or carry-over) and apply it consistently to
/// selection and to `customers_ahead`.
#[async_trait]
pub trait TicketStore: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, TurnstileError>;

    /// Upserts departments, services and counters. Existing tickets are untouched.
    async fn sync_directory(&self, directory: Directory) -> Result<(), TurnstileError>;

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, TurnstileError>;

    async fn get_counter(&self, id: CounterId) -> Result<Option<Counter>, TurnstileError>;

    /// The counter operated by `agent`, if one is assigned.
    async fn counter_for_agent(&self, agent: &AgentId) -> Result<Option<Counter>, TurnstileError>;

    /// Allocates the next number for the service and day and inserts a waiting ticket.
    async fn insert_ticket(
        &self,
        ticket: NewTicket,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Issued, TurnstileError>;

    /// Ticket with freshly computed estimates.
    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, TurnstileError>;

    /// Filtered listing, newest first.
    async fn list_tickets(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, TurnstileError>;

    /// In-progress tickets in call order.
    async fn list_in_progress(&self, page: PageRequest) -> Result<Page<Ticket>, TurnstileError>;

    /// The ticket the counter would be assigned next, without mutating anything.
    async fn select_next(
        &self,
        counter: CounterId,
        today: NaiveDate,
    ) -> Result<Option<Ticket>, TurnstileError>;

    /// Completes the counter's current ticket and assigns the head of its queue.
    async fn call_next(&self, request: CallRequest) -> Result<Transition, TurnstileError>;

    /// Records a hand-off target. Leaves status and counter unchanged.
    async fn redirect(
        &self,
        ticket: TicketId,
        target: CounterId,
    ) -> Result<Ticket, TurnstileError>;

    /// Current board with the latest committed revision.
    async fn board(&self) -> Result<BoardSnapshot, TurnstileError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), TurnstileError>;
}
