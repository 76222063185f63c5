// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Turnstile queue service.
//!
//! This crate provides the domain types, the error taxonomy, the ticket
//! numbering rules and the [`TicketStore`] trait shared across the workspace.

pub mod clock;
pub mod error;
pub mod numbering;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock, business_day};
pub use error::TurnstileError;
pub use traits::TicketStore;
pub use types::*;
