// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification topics.

use std::fmt;

use turnstile_core::TicketId;

/// A channel subscribers can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// "You're next" announcements for every service.
    Ahead,
    /// Updates for one ticket, used by the customer holding it.
    Ticket(TicketId),
    /// The lobby board of tickets currently being served.
    InProgressBoard,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ahead => f.write_str("ahead-notifications"),
            Self::Ticket(id) => write!(f, "ticket:{id}"),
            Self::InProgressBoard => f.write_str("tickets-in-progress"),
        }
    }
}
