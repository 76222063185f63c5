// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification hub for live queue updates.
//!
//! Publishers hand events to the hub without waiting; a single dispatcher
//! task serializes each event once and fans it out to the mailboxes of the
//! topic's members. Delivery is at-most-once: a full or closed mailbox
//! loses the event.

mod dispatcher;
pub mod event;
pub mod hub;
mod registry;
pub mod topic;

pub use event::{AheadNotification, HubEvent, TicketServed};
pub use hub::NotificationHub;
pub use registry::{SubscriberId, Subscription};
pub use topic::Topic;
