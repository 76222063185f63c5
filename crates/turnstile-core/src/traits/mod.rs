// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the queue service and its backends.

pub mod store;

pub use store::TicketStore;
