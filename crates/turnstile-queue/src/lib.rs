// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue orchestration for Turnstile.
//!
//! [`QueueService`] sits between the transport layer and the [`TicketStore`]:
//! it validates input, derives the calling counter from the agent,
//! serializes calls per counter, retries a lost compare-and-set once and
//! publishes notifications after every commit.
//!
//! [`TicketStore`]: turnstile_core::TicketStore

pub mod service;
pub mod validate;

pub use service::QueueService;
