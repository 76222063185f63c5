// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire payloads pushed to subscribers, tagged by `type`.

use serde::{Deserialize, Serialize};
use turnstile_core::{BoardSnapshot, TicketId};

/// A service's queue is down to one waiting ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AheadNotification {
    pub ticket_number: String,
    pub service_name: String,
    pub customer_name: String,
}

/// A ticket was called to a counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketServed {
    pub ticket_id: TicketId,
    pub ticket_number: String,
    /// Short form for displays, see `numbering::display_number`.
    pub display_number: String,
    pub counter_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubEvent {
    Ahead(AheadNotification),
    TicketServed(TicketServed),
    Board(BoardSnapshot),
}
