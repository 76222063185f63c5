// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite ticket store for the Turnstile queue service.
//!
//! WAL-mode SQLite with embedded migrations and a single writer thread
//! (`tokio-rusqlite`). Every mutation is one transaction; call-next runs as
//! an `IMMEDIATE` transaction with a compare-and-set on the selected head.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteTicketStore;
pub use database::Database;
