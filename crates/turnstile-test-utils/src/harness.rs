// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full queue stack around a temp SQLite
//! database seeded with the [`StandardDirectory`], a live notification hub
//! and a [`ManualClock`] so issue and call times are deterministic.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use turnstile_config::model::{HubConfig, QueueConfig, StorageConfig};
use turnstile_core::{
    AgentId, CallOutcome, Clock, ManualClock, ServiceId, Ticket, TicketStore, TurnstileError,
};
use turnstile_hub::NotificationHub;
use turnstile_queue::QueueService;
use turnstile_storage::SqliteTicketStore;

use crate::fixtures::{StandardDirectory, new_ticket};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    queue: QueueConfig,
    hub: HubConfig,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            queue: QueueConfig::default(),
            hub: HubConfig::default(),
            start: Utc
                .with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Let the selector reach waiting tickets from earlier business days.
    pub fn with_carry_over(mut self) -> Self {
        self.queue.carry_over_waiting = true;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.queue.utc_offset_minutes = minutes;
        self
    }

    pub fn with_subscriber_buffer(mut self, capacity: usize) -> Self {
        self.hub.subscriber_buffer = capacity;
        self
    }

    /// Start the manual clock at `start` instead of 2026-03-02 08:00 UTC.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Build the harness. Must run inside a Tokio runtime.
    pub async fn build(self) -> Result<TestHarness, TurnstileError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TurnstileError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("turnstile-test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let store = SqliteTicketStore::new(storage_config, &self.queue);
        store.initialize().await?;

        let directory = StandardDirectory::new();
        store.sync_directory(directory.directory()).await?;
        let store = Arc::new(store);

        let clock = Arc::new(ManualClock::new(self.start));
        let hub = NotificationHub::new(&self.hub);
        let queue = Arc::new(QueueService::new(
            store.clone(),
            hub.clone(),
            clock.clone(),
            &self.queue,
        ));

        Ok(TestHarness {
            queue,
            store,
            hub,
            clock,
            directory,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete queue environment on temp storage.
pub struct TestHarness {
    pub queue: Arc<QueueService>,
    /// SQLite store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteTicketStore>,
    pub hub: NotificationHub,
    pub clock: Arc<ManualClock>,
    pub directory: StandardDirectory,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default options.
    pub async fn new() -> Result<Self, TurnstileError> {
        Self::builder().build().await
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Advance the clock one minute, then issue a ticket for `service`.
    pub async fn issue(&self, service: ServiceId, customer_name: &str) -> Result<Ticket, TurnstileError> {
        self.advance(Duration::minutes(1));
        self.queue.issue_ticket(new_ticket(service, customer_name)).await
    }

    /// Advance the clock one minute, then call next on behalf of `agent`.
    pub async fn call(&self, agent: &str) -> Result<CallOutcome, TurnstileError> {
        self.advance(Duration::minutes(1));
        self.queue.call_next(&AgentId::from(agent), None).await
    }

    /// Close the store, checkpointing the WAL.
    pub async fn close(&self) -> Result<(), TurnstileError> {
        self.store.close().await
    }
}
