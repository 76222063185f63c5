// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The call-next transaction.
//!
//! One `IMMEDIATE` transaction selects the counter's head, completes the
//! ticket the counter was serving and claims the head with a
//! compare-and-set on `called_at IS NULL`. When the claim changes no row,
//! the transaction is dropped (rolling back the completion too) and a
//! conflict is reported. The board revision is bumped after commit, on the
//! writer thread, so revisions follow commit order.

use std::sync::atomic::Ordering;

use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::debug;
use turnstile_core::{
    Assignment, BoardSnapshot, CallRequest, TicketId, Transition, TurnstileError,
};

use crate::database::{Database, map_tr_err};
use crate::models::{format_day, format_timestamp, uuid_column};
use crate::queries::board::entries;
use crate::queries::selector::{head_for_counter, lone_waiting};
use crate::queries::tickets::load_ticket;

pub async fn call_next(
    db: &Database,
    request: CallRequest,
    carry_over: bool,
) -> Result<Transition, TurnstileError> {
    let revision = db.revision();
    let counter = request.counter.to_string();
    let agent = request.agent.as_str().to_string();
    let called_at = format_timestamp(request.now);
    let today = format_day(request.today);

    let transition = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some(head) = head_for_counter(&tx, &counter, &today, carry_over)? else {
                return Ok(Transition::QueueEmpty);
            };

            let completed = tx
                .query_row(
                    "UPDATE tickets SET status = 'completed'
                      WHERE counter_id = ?1 AND status = 'in_progress'
                      RETURNING id",
                    params![counter],
                    |row| uuid_column::<TicketId>(row, 0),
                )
                .optional()?;

            let claimed = tx.execute(
                "UPDATE tickets
                    SET status = 'in_progress', called_at = ?1, counter_id = ?2, served_by = ?3
                  WHERE id = ?4 AND called_at IS NULL AND status = 'waiting'",
                params![called_at, counter, agent, head.to_string()],
            )?;
            if claimed != 1 {
                return Ok(Transition::Conflict { ticket: head });
            }

            let ticket = load_ticket(&tx, head, carry_over)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            let lone = lone_waiting(&tx, &ticket.service.to_string(), &today, carry_over)?;
            let board_entries = entries(&tx)?;
            tx.commit()?;

            let board = BoardSnapshot {
                revision: revision.fetch_add(1, Ordering::SeqCst) + 1,
                entries: board_entries,
            };
            Ok(Transition::Assigned(Box::new(Assignment {
                ticket,
                completed,
                board,
                lone_waiting: lone,
            })))
        })
        .await
        .map_err(map_tr_err)?;

    match &transition {
        Transition::Assigned(assignment) => debug!(
            counter = %request.counter,
            ticket = %assignment.ticket.number,
            completed = ?assignment.completed,
            revision = assignment.board.revision,
            "ticket assigned"
        ),
        Transition::QueueEmpty => debug!(counter = %request.counter, "queue empty"),
        Transition::Conflict { ticket } => {
            debug!(counter = %request.counter, %ticket, "head claimed concurrently")
        }
    }
    Ok(transition)
}
