// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, migrations, lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writers. Do not open extra connections for writes.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use tracing::debug;
use turnstile_core::TurnstileError;

use crate::migrations::run_migrations;

/// Handle to the ticket database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    /// Board revision, bumped on the writer thread after each committed call-next.
    revision: Arc<AtomicU64>,
}

impl Database {
    /// Open (or create) the database with WAL enabled and run pending migrations.
    pub async fn open(path: &str) -> Result<Self, TurnstileError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, TurnstileError> {
        if let Some(parent) = Path::new(path)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|e| TurnstileError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| TurnstileError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(run_migrations).await.map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => TurnstileError::Storage {
                source: other.to_string().into(),
            },
        })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self {
            conn,
            revision: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub(crate) fn revision(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.revision)
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), TurnstileError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into [`TurnstileError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TurnstileError {
    TurnstileError::Storage {
        source: Box::new(e),
    }
}
