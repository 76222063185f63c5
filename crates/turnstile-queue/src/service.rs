// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The queue service: every ticket operation the gateway exposes.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use turnstile_config::model::QueueConfig;
use turnstile_core::numbering::display_number;
use turnstile_core::{
    AgentId, Assignment, BoardSnapshot, CallOutcome, CallRequest, Clock, CounterId, Issued,
    NewTicket, Page, PageRequest, ServiceId, Ticket, TicketFilter, TicketId, TicketStore,
    Transition, TurnstileError, WaitingHead, business_day,
};
use turnstile_hub::{AheadNotification, NotificationHub, TicketServed};

use crate::validate::validate_customer;

/// Attempts at the call-next transaction before a conflict is surfaced.
const CALL_ATTEMPTS: usize = 2;

/// Orchestrates ticket issuance, call-next and redirects over a [`TicketStore`].
pub struct QueueService {
    store: Arc<dyn TicketStore>,
    hub: NotificationHub,
    clock: Arc<dyn Clock>,
    utc_offset_minutes: i32,
    counter_locks: DashMap<CounterId, Arc<Mutex<()>>>,
    /// Last ticket announced on the ahead topic, per service.
    announced: DashMap<ServiceId, TicketId>,
}

impl QueueService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        hub: NotificationHub,
        clock: Arc<dyn Clock>,
        config: &QueueConfig,
    ) -> Self {
        Self {
            store,
            hub,
            clock,
            utc_offset_minutes: config.utc_offset_minutes,
            counter_locks: DashMap::new(),
            announced: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        business_day(now, self.utc_offset_minutes)
    }

    /// Validate and issue a new waiting ticket.
    pub async fn issue_ticket(&self, new: NewTicket) -> Result<Ticket, TurnstileError> {
        validate_customer(&new.customer)?;
        if self.store.get_service(new.service).await?.is_none() {
            return Err(TurnstileError::Validation(format!(
                "service {} does not exist",
                new.service
            )));
        }

        let now = self.clock.now();
        let issued = self.store.insert_ticket(new, now, self.today(now)).await?;
        metrics::counter!("turnstile_tickets_issued_total").increment(1);
        info!(
            ticket_id = %issued.ticket.id,
            number = %issued.ticket.number,
            service = %issued.ticket.service_symbol,
            "ticket issued"
        );

        self.after_issue(&issued);
        Ok(issued.ticket)
    }

    pub async fn get_ticket(&self, id: TicketId) -> Result<Ticket, TurnstileError> {
        self.store
            .get_ticket(id)
            .await?
            .ok_or_else(|| TurnstileError::not_found("ticket", id))
    }

    pub async fn list_tickets(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, TurnstileError> {
        self.store.list_tickets(filter, page).await
    }

    pub async fn list_in_progress(&self, page: PageRequest) -> Result<Page<Ticket>, TurnstileError> {
        self.store.list_in_progress(page).await
    }

    pub async fn board(&self) -> Result<BoardSnapshot, TurnstileError> {
        self.store.board().await
    }

    /// Call the next eligible ticket to the agent's counter.
    ///
    /// The counter is derived from the agent. A `requested` counter id, when
    /// given, must name that same counter. Calls at one counter are
    /// serialized; a lost compare-and-set is retried once with a fresh
    /// selection before [`TurnstileError::Conflict`] is returned.
    pub async fn call_next(
        &self,
        agent: &AgentId,
        requested: Option<CounterId>,
    ) -> Result<CallOutcome, TurnstileError> {
        let counter = self
            .store
            .counter_for_agent(agent)
            .await?
            .ok_or_else(|| {
                TurnstileError::Validation(format!("no counter is assigned to agent {agent}"))
            })?;
        if let Some(requested) = requested.filter(|id| *id != counter.id) {
            return Err(TurnstileError::Validation(format!(
                "counter {requested} is not assigned to agent {agent}"
            )));
        }

        let lock = self.counter_lock(counter.id);
        let _guard = lock.lock().await;

        let mut lost = None;
        for attempt in 1..=CALL_ATTEMPTS {
            let now = self.clock.now();
            let request = CallRequest {
                counter: counter.id,
                agent: agent.clone(),
                now,
                today: self.today(now),
            };
            match self.store.call_next(request).await? {
                Transition::Assigned(assignment) => {
                    metrics::counter!("turnstile_tickets_called_total").increment(1);
                    let waited = (now - assignment.ticket.created_at).num_milliseconds();
                    metrics::histogram!("turnstile_wait_seconds").record(waited as f64 / 1000.0);
                    info!(
                        ticket_id = %assignment.ticket.id,
                        number = %assignment.ticket.number,
                        counter = counter.number,
                        completed = ?assignment.completed,
                        "ticket called"
                    );
                    self.after_call(&assignment);
                    return Ok(CallOutcome::Called(assignment));
                }
                Transition::QueueEmpty => {
                    metrics::counter!("turnstile_queue_empty_total").increment(1);
                    debug!(counter = counter.number, "queue empty");
                    return Ok(CallOutcome::QueueEmpty);
                }
                Transition::Conflict { ticket } => {
                    metrics::counter!("turnstile_call_conflicts_total").increment(1);
                    warn!(counter = counter.number, %ticket, attempt, "call-next lost a race");
                    lost = Some(ticket);
                }
            }
        }

        Err(TurnstileError::Conflict {
            ticket: lost.map(|t| t.to_string()).unwrap_or_default(),
        })
    }

    /// Mark a ticket for hand-off to another counter.
    pub async fn redirect(
        &self,
        ticket: TicketId,
        target: CounterId,
    ) -> Result<Ticket, TurnstileError> {
        let redirected = self.store.redirect(ticket, target).await?;
        info!(ticket_id = %ticket, target = %target, "ticket redirected");
        Ok(redirected)
    }

    fn counter_lock(&self, counter: CounterId) -> Arc<Mutex<()>> {
        Arc::clone(self.counter_locks.entry(counter).or_default().value())
    }

    fn after_issue(&self, issued: &Issued) {
        if let Some(head) = &issued.lone_waiting {
            self.announce(head);
        }
    }

    fn after_call(&self, assignment: &Assignment) {
        let ticket = &assignment.ticket;
        if let Some(counter_number) = ticket.counter_number {
            self.hub.publish_ticket_served(TicketServed {
                ticket_id: ticket.id,
                ticket_number: ticket.number.clone(),
                display_number: display_number(&ticket.number),
                counter_number,
            });
        }
        self.hub.publish_board(assignment.board.clone());
        if let Some(head) = &assignment.lone_waiting {
            self.announce(head);
        }
    }

    /// Publish an ahead notification for `head` unless it was already announced.
    fn announce(&self, head: &WaitingHead) {
        if self.announced.insert(head.service, head.ticket) == Some(head.ticket) {
            return;
        }
        debug!(ticket_id = %head.ticket, number = %head.ticket_number, "announcing queue head");
        self.hub.publish_ahead(AheadNotification {
            ticket_number: head.ticket_number.clone(),
            service_name: head.service_name.clone(),
            customer_name: head.customer_name.clone(),
        });
    }
}
