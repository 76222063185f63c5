// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Turnstile integration tests.
//!
//! - [`TestHarness`] - temp SQLite store, notification hub, queue service and manual clock
//! - [`fixtures`] - a small standard directory and ticket builders

pub mod fixtures;
pub mod harness;

pub use fixtures::{StandardDirectory, new_ticket};
pub use harness::{TestHarness, TestHarnessBuilder};
