// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue selection: which waiting ticket a counter gets next.
//!
//! Eligible tickets belong to a service whose department the counter is
//! linked to and have never been called. The head is the earliest
//! `created_at`, insertion order breaking ties. Unless carry-over is
//! enabled, only tickets issued on the current business day are eligible.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use turnstile_core::{CounterId, ServiceId, Ticket, TicketId, TurnstileError, WaitingHead};

use crate::database::{Database, map_tr_err};
use crate::models::{format_day, uuid_column};
use crate::queries::tickets::load_ticket;

/// Id of the head of the counter's queue.
pub(crate) fn head_for_counter(
    conn: &Connection,
    counter: &str,
    today: &str,
    carry_over: bool,
) -> rusqlite::Result<Option<TicketId>> {
    conn.query_row(
        "SELECT t.id FROM tickets t
           JOIN services s ON s.id = t.service_id
           JOIN counter_departments cd
             ON cd.department_id = s.department_id AND cd.counter_id = ?1
          WHERE t.called_at IS NULL
            AND t.status = 'waiting'
            AND (?3 OR t.business_day = ?2)
          ORDER BY t.created_at ASC, t.seq ASC
          LIMIT 1",
        params![counter, today, carry_over],
        |row| uuid_column::<TicketId>(row, 0),
    )
    .optional()
}

/// The only waiting ticket of `service`, if exactly one is waiting.
pub(crate) fn lone_waiting(
    conn: &Connection,
    service: &str,
    today: &str,
    carry_over: bool,
) -> rusqlite::Result<Option<WaitingHead>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.service_id, t.number, s.name, t.customer_name
           FROM tickets t
           JOIN services s ON s.id = t.service_id
          WHERE t.service_id = ?1
            AND t.called_at IS NULL
            AND (?3 OR t.business_day = ?2)
          LIMIT 2",
    )?;
    let mut heads = stmt
        .query_map(params![service, today, carry_over], |row| {
            Ok(WaitingHead {
                ticket: uuid_column::<TicketId>(row, 0)?,
                service: uuid_column::<ServiceId>(row, 1)?,
                ticket_number: row.get(2)?,
                service_name: row.get(3)?,
                customer_name: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(if heads.len() == 1 { heads.pop() } else { None })
}

/// The ticket `counter` would be assigned next, without mutating anything.
pub async fn select_next(
    db: &Database,
    counter: CounterId,
    today: NaiveDate,
    carry_over: bool,
) -> Result<Option<Ticket>, TurnstileError> {
    let today = format_day(today);
    db.connection()
        .call(move |conn| {
            match head_for_counter(conn, &counter.to_string(), &today, carry_over)? {
                Some(id) => load_ticket(conn, id, carry_over),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::testing::{at, day, fixture, new_ticket};
    use crate::queries::tickets::insert_ticket;

    #[tokio::test]
    async fn empty_queue_selects_nothing() {
        let f = fixture().await;
        assert!(select_next(&f.db, f.counter_one, day(), false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn head_is_earliest_eligible_ticket() {
        let f = fixture().await;
        insert_ticket(&f.db, new_ticket(f.payments, "Zed"), at(0), day(), false)
            .await
            .unwrap();
        let second = insert_ticket(&f.db, new_ticket(f.licensing, "Ana"), at(2), day(), false)
            .await
            .unwrap()
            .unwrap();
        insert_ticket(&f.db, new_ticket(f.licensing, "Bo"), at(3), day(), false)
            .await
            .unwrap();

        let head = select_next(&f.db, f.counter_one, day(), false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(head.id, second.ticket.id);
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_insertion_order() {
        let f = fixture().await;
        let first = insert_ticket(&f.db, new_ticket(f.licensing, "Ana"), at(5), day(), false)
            .await
            .unwrap()
            .unwrap();
        insert_ticket(&f.db, new_ticket(f.licensing, "Bo"), at(5), day(), false)
            .await
            .unwrap();

        let head = select_next(&f.db, f.counter_one, day(), false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(head.id, first.ticket.id);
    }

    #[tokio::test]
    async fn previous_day_tickets_need_carry_over() {
        let f = fixture().await;
        let yesterday = day().pred_opt().unwrap();
        let stale = insert_ticket(
            &f.db,
            new_ticket(f.licensing, "Old"),
            at(-24 * 60),
            yesterday,
            false,
        )
        .await
        .unwrap()
        .unwrap();

        assert!(select_next(&f.db, f.counter_one, day(), false).await.unwrap().is_none());
        let carried = select_next(&f.db, f.counter_one, day(), true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(carried.id, stale.ticket.id);
    }
}
