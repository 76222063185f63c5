// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-progress board shown on lobby displays.

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use rusqlite::Connection;
use turnstile_core::{BoardEntry, BoardSnapshot, TicketStatus, TurnstileError};

use crate::database::{Database, map_tr_err};

/// Current in-progress entries in call order, one per `(counter, ticket)` pair.
pub(crate) fn entries(conn: &Connection) -> rusqlite::Result<Vec<BoardEntry>> {
    let mut stmt = conn.prepare(
        "SELECT t.number, c.number
           FROM tickets t
           JOIN counters c ON c.id = t.counter_id
          WHERE t.status = 'in_progress'
          ORDER BY t.called_at ASC, t.seq ASC",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    Ok(rows
        .into_iter()
        .filter(|(ticket, counter)| seen.insert((*counter, ticket.clone())))
        .map(|(ticket_number, counter_number)| BoardEntry {
            ticket_number,
            counter_number,
            status: TicketStatus::InProgress,
        })
        .collect())
}

/// Board as of the latest committed call-next.
pub async fn board(db: &Database) -> Result<BoardSnapshot, TurnstileError> {
    let revision = db.revision();
    db.connection()
        .call(move |conn| {
            Ok(BoardSnapshot {
                entries: entries(conn)?,
                revision: revision.load(Ordering::SeqCst),
            })
        })
        .await
        .map_err(map_tr_err)
}
