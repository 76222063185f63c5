// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store, the queue service, the hub and the gateway.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a ticket.
    TicketId
);
uuid_id!(
    /// Unique identifier for a counter.
    CounterId
);
uuid_id!(
    /// Unique identifier for a service.
    ServiceId
);
uuid_id!(
    /// Unique identifier for a department.
    DepartmentId
);

/// Identity of an agent (the user operating a counter), as asserted by the auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Not operational.
    Unhealthy(String),
}

/// Lifecycle of a ticket. There is no way back to `Waiting`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketStatus {
    Waiting,
    InProgress,
    Completed,
}

/// Descriptive kind of a service point. Has no effect on queue selection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CounterType {
    #[default]
    Counter,
    Cashier,
}

/// A department groups services; counters are eligible for whole departments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub name_ar: String,
}

/// A service customers can draw tickets for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    /// Short code used as the ticket number prefix.
    pub symbol: String,
    pub name: String,
    pub name_ar: String,
    pub department: DepartmentId,
}

/// A physical or logical service point operated by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub id: CounterId,
    /// Display number, unique across counters.
    pub number: u32,
    pub counter_type: CounterType,
    /// Departments whose services this counter may call.
    pub departments: Vec<DepartmentId>,
    pub employee: Option<AgentId>,
}

/// The administration-owned directory the core reads from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub departments: Vec<Department>,
    pub services: Vec<Service>,
    pub counters: Vec<Counter>,
}

/// Customer contact details carried on a ticket for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub customer_name: String,
    #[serde(default)]
    pub customer_name_ar: String,
    #[serde(default)]
    pub nationality: String,
    pub mobile_number: String,
    pub email: String,
}

/// Input for issuing a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub service: ServiceId,
    #[serde(flatten)]
    pub customer: CustomerContact,
}

/// Full ticket representation, including the position and wait estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub number: String,
    pub service: ServiceId,
    pub service_name: String,
    pub service_name_ar: String,
    pub service_symbol: String,
    /// Local calendar day the ticket was issued in; scopes the number sequence.
    pub business_day: NaiveDate,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub counter: Option<CounterId>,
    pub counter_number: Option<u32>,
    pub redirect_to: Option<CounterId>,
    pub served_by: Option<AgentId>,
    pub hold_reason: Option<String>,
    #[serde(flatten)]
    pub customer: CustomerContact,
    /// Waiting tickets of the same service issued earlier.
    pub customers_ahead: u64,
    /// Mean seconds between issue and call over earlier completed tickets of the service.
    pub avg_wait_time_secs: f64,
}

/// Head of a service's waiting line, used for "you're next" announcements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingHead {
    pub ticket: TicketId,
    pub service: ServiceId,
    pub ticket_number: String,
    pub service_name: String,
    pub customer_name: String,
}

/// Result of inserting a ticket.
#[derive(Debug, Clone)]
pub struct Issued {
    pub ticket: Ticket,
    /// Set when the new ticket's service now has exactly one waiting ticket.
    pub lone_waiting: Option<WaitingHead>,
}

/// One row of the in-progress board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardEntry {
    pub ticket_number: String,
    pub counter_number: u32,
    pub status: TicketStatus,
}

/// Full list of in-progress tickets, stamped with a commit-ordered revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub revision: u64,
    pub entries: Vec<BoardEntry>,
}

/// A committed call-next transition.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The ticket now in progress at the counter.
    pub ticket: Ticket,
    /// The ticket the counter was serving before, now completed.
    pub completed: Option<TicketId>,
    /// Board state as of this commit.
    pub board: BoardSnapshot,
    /// Set when the called ticket's service is left with exactly one waiting ticket.
    pub lone_waiting: Option<WaitingHead>,
}

/// What the store did with a call-next request.
#[derive(Debug, Clone)]
pub enum Transition {
    Assigned(Box<Assignment>),
    /// Nothing eligible is waiting; nothing was mutated.
    QueueEmpty,
    /// The selected head was taken between selection and update; nothing was mutated.
    Conflict { ticket: TicketId },
}

/// Input for a call-next transaction.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub counter: CounterId,
    pub agent: AgentId,
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

/// Outcome of `call_next` as seen by callers of the queue service.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    Called(Box<Assignment>),
    QueueEmpty,
}

/// Filters for the ticket listing. All string filters are case-insensitive "contains".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilter {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    /// Inclusive lower bound on the UTC creation date.
    #[serde(default)]
    pub created_from: Option<NaiveDate>,
    /// Inclusive upper bound on the UTC creation date.
    #[serde(default)]
    pub created_to: Option<NaiveDate>,
}

/// Page-number pagination request (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 5;
    pub const MAX_PAGE_SIZE: u32 = 1000;

    /// Build a request, falling back to defaults and clamping the page size.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(Self::DEFAULT_PAGE_SIZE)
                .clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub num_pages: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: u64, request: PageRequest, results: Vec<T>) -> Self {
        Self {
            count,
            num_pages: count.div_ceil(u64::from(request.page_size)),
            results,
        }
    }
}
