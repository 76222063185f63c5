// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`TicketStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use turnstile_config::model::{QueueConfig, StorageConfig};
use turnstile_core::{
    AgentId, BoardSnapshot, CallRequest, Counter, CounterId, Directory, HealthStatus, Issued,
    NewTicket, Page, PageRequest, Service, ServiceId, Ticket, TicketFilter, TicketId,
    TicketStore, Transition, TurnstileError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed ticket store.
///
/// The database is opened by [`SqliteTicketStore::initialize`]; every trait
/// method fails with a storage error until then.
pub struct SqliteTicketStore {
    config: StorageConfig,
    carry_over_waiting: bool,
    db: OnceCell<Database>,
}

impl SqliteTicketStore {
    /// Create a store. The connection is not opened until [`initialize`](Self::initialize).
    pub fn new(config: StorageConfig, queue: &QueueConfig) -> Self {
        Self {
            config,
            carry_over_waiting: queue.carry_over_waiting,
            db: OnceCell::new(),
        }
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), TurnstileError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TurnstileError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(
            path = %self.config.database_path,
            carry_over = self.carry_over_waiting,
            "SQLite ticket store initialized"
        );
        Ok(())
    }

    fn db(&self) -> Result<&Database, TurnstileError> {
        self.db.get().ok_or_else(|| TurnstileError::Storage {
            source: "store not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, TurnstileError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        let probe = db
            .connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err);
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn sync_directory(&self, directory: Directory) -> Result<(), TurnstileError> {
        queries::directory::sync_directory(self.db()?, directory).await
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, TurnstileError> {
        queries::directory::get_service(self.db()?, id).await
    }

    async fn get_counter(&self, id: CounterId) -> Result<Option<Counter>, TurnstileError> {
        queries::directory::get_counter(self.db()?, id).await
    }

    async fn counter_for_agent(&self, agent: &AgentId) -> Result<Option<Counter>, TurnstileError> {
        queries::directory::counter_for_agent(self.db()?, agent).await
    }

    async fn insert_ticket(
        &self,
        ticket: NewTicket,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Issued, TurnstileError> {
        let service = ticket.service;
        queries::tickets::insert_ticket(self.db()?, ticket, now, today, self.carry_over_waiting)
            .await?
            .ok_or_else(|| TurnstileError::not_found("service", service))
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, TurnstileError> {
        queries::tickets::get_ticket(self.db()?, id, self.carry_over_waiting).await
    }

    async fn list_tickets(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, TurnstileError> {
        queries::tickets::list_tickets(self.db()?, filter, page, self.carry_over_waiting).await
    }

    async fn list_in_progress(&self, page: PageRequest) -> Result<Page<Ticket>, TurnstileError> {
        queries::tickets::list_in_progress(self.db()?, page, self.carry_over_waiting).await
    }

    async fn select_next(
        &self,
        counter: CounterId,
        today: NaiveDate,
    ) -> Result<Option<Ticket>, TurnstileError> {
        queries::selector::select_next(self.db()?, counter, today, self.carry_over_waiting).await
    }

    async fn call_next(&self, request: CallRequest) -> Result<Transition, TurnstileError> {
        queries::transition::call_next(self.db()?, request, self.carry_over_waiting).await
    }

    async fn redirect(
        &self,
        ticket: TicketId,
        target: CounterId,
    ) -> Result<Ticket, TurnstileError> {
        queries::tickets::redirect(self.db()?, ticket, target, self.carry_over_waiting).await
    }

    async fn board(&self) -> Result<BoardSnapshot, TurnstileError> {
        queries::board::board(self.db()?).await
    }

    async fn close(&self) -> Result<(), TurnstileError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_store(path: &str) -> SqliteTicketStore {
        SqliteTicketStore::new(
            StorageConfig {
                database_path: path.to_string(),
                wal_mode: true,
            },
            &QueueConfig::default(),
        )
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init.db");
        let store = make_store(db_path.to_str().unwrap());
        store.initialize().await.unwrap();
        assert!(db_path.exists());
        assert_eq!(store.name(), "sqlite");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path().join("twice.db").to_str().unwrap());
        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_reflects_initialization() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path().join("health.db").to_str().unwrap());
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path().join("svc.db").to_str().unwrap());
        store.initialize().await.unwrap();

        let ticket = NewTicket {
            service: ServiceId::new(),
            customer: turnstile_core::CustomerContact {
                customer_name: "Ana".into(),
                customer_name_ar: String::new(),
                nationality: String::new(),
                mobile_number: "0501234567".into(),
                email: "ana@example.com".into(),
            },
        };
        let err = store
            .insert_ticket(ticket, Utc::now(), Utc::now().date_naive())
            .await
            .unwrap_err();
        assert!(matches!(err, TurnstileError::NotFound { entity: "service", .. }));
        store.close().await.unwrap();
    }
}
