// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket issuance, reads and redirects.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params, params_from_iter};
use turnstile_core::numbering::{format_number, next_sequence, number_prefix};
use turnstile_core::{
    CounterId, Issued, NewTicket, Page, PageRequest, Ticket, TicketFilter, TicketId,
    TurnstileError,
};

use crate::database::{Database, map_tr_err};
use crate::models::{TICKET_SELECT, format_day, format_timestamp, ticket_from_row};
use crate::queries::directory::counter_exists;
use crate::queries::selector::lone_waiting;

/// Load one ticket with estimates.
pub(crate) fn load_ticket(
    conn: &Connection,
    id: TicketId,
    carry_over: bool,
) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!("{TICKET_SELECT} WHERE t.id = ?2"),
        params![carry_over, id.to_string()],
        ticket_from_row,
    )
    .optional()
}

/// Allocate the next number for the service and business day and insert a
/// waiting ticket, all in one `IMMEDIATE` transaction.
///
/// Returns `None` when the service does not exist.
pub async fn insert_ticket(
    db: &Database,
    ticket: NewTicket,
    now: DateTime<Utc>,
    today: NaiveDate,
    carry_over: bool,
) -> Result<Option<Issued>, TurnstileError> {
    let id = TicketId::new();
    let created_at = format_timestamp(now);
    let today = format_day(today);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let service = ticket.service.to_string();

            let Some(symbol) = tx
                .query_row(
                    "SELECT symbol FROM services WHERE id = ?1",
                    params![service],
                    |row| row.get::<_, String>(0),
                )
                .optional()?
            else {
                return Ok(None);
            };

            let prefix = number_prefix(&symbol);
            let highest: Option<i64> = tx.query_row(
                "SELECT MAX(CAST(substr(number, length(?3) + 1) AS INTEGER)) FROM tickets
                  WHERE service_id = ?1 AND business_day = ?2
                    AND substr(number, 1, length(?3)) = ?3",
                params![service, today, prefix],
                |row| row.get(0),
            )?;
            let highest = highest.and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0);
            let number = format_number(&symbol, next_sequence(highest));

            let customer = &ticket.customer;
            tx.execute(
                "INSERT INTO tickets (id, number, service_id, business_day, status, created_at,
                                      customer_name, customer_name_ar, nationality,
                                      mobile_number, email)
                 VALUES (?1, ?2, ?3, ?4, 'waiting', ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id.to_string(),
                    number,
                    service,
                    today,
                    created_at,
                    customer.customer_name,
                    customer.customer_name_ar,
                    customer.nationality,
                    customer.mobile_number,
                    customer.email
                ],
            )?;

            let issued = load_ticket(&tx, id, carry_over)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            let lone = lone_waiting(&tx, &service, &today, carry_over)?;
            tx.commit()?;

            Ok(Some(Issued {
                ticket: issued,
                lone_waiting: lone,
            }))
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_ticket(
    db: &Database,
    id: TicketId,
    carry_over: bool,
) -> Result<Option<Ticket>, TurnstileError> {
    db.connection()
        .call(move |conn| load_ticket(conn, id, carry_over))
        .await
        .map_err(map_tr_err)
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Filtered listing, newest first.
pub async fn list_tickets(
    db: &Database,
    filter: TicketFilter,
    page: PageRequest,
    carry_over: bool,
) -> Result<Page<Ticket>, TurnstileError> {
    let mut clauses: Vec<&'static str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql + Send>> = Vec::new();

    let text_filters = [
        ("t.number LIKE ? ESCAPE '\\'", &filter.number),
        ("t.customer_name LIKE ? ESCAPE '\\'", &filter.customer_name),
        ("t.mobile_number LIKE ? ESCAPE '\\'", &filter.mobile_number),
        ("t.email LIKE ? ESCAPE '\\'", &filter.email),
    ];
    for (clause, value) in text_filters {
        if let Some(needle) = value.as_deref().filter(|v| !v.is_empty()) {
            clauses.push(clause);
            values.push(Box::new(contains_pattern(needle)));
        }
    }
    if let Some(status) = filter.status {
        clauses.push("t.status = ?");
        values.push(Box::new(status.to_string()));
    }
    if let Some(from) = filter.created_from {
        clauses.push("substr(t.created_at, 1, 10) >= ?");
        values.push(Box::new(format_day(from)));
    }
    if let Some(to) = filter.created_to {
        clauses.push("substr(t.created_at, 1, 10) <= ?");
        values.push(Box::new(format_day(to)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    paginate(db, where_sql, "t.created_at DESC, t.seq DESC", values, page, carry_over).await
}

/// In-progress tickets in call order.
pub async fn list_in_progress(
    db: &Database,
    page: PageRequest,
    carry_over: bool,
) -> Result<Page<Ticket>, TurnstileError> {
    paginate(
        db,
        " WHERE t.status = 'in_progress'".to_string(),
        "t.called_at ASC, t.seq ASC",
        Vec::new(),
        page,
        carry_over,
    )
    .await
}

/// Run a count and a page query over [`TICKET_SELECT`] with the same filter.
///
/// Filter placeholders are anonymous `?`, numbered after the carry-over flag (`?1`).
async fn paginate(
    db: &Database,
    where_sql: String,
    order_sql: &'static str,
    values: Vec<Box<dyn ToSql + Send>>,
    page: PageRequest,
    carry_over: bool,
) -> Result<Page<Ticket>, TurnstileError> {
    let limit = i64::from(page.page_size);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let count_sql = format!("SELECT COUNT(*) FROM tickets t{where_sql}");
            let count: i64 = conn.query_row(
                &count_sql,
                params_from_iter(values.iter().map(|v| v.as_ref() as &dyn ToSql)),
                |row| row.get(0),
            )?;

            let page_sql =
                format!("{TICKET_SELECT}{where_sql} ORDER BY {order_sql} LIMIT ? OFFSET ?");
            let mut bound: Vec<&dyn ToSql> = Vec::with_capacity(values.len() + 3);
            bound.push(&carry_over);
            bound.extend(values.iter().map(|v| v.as_ref() as &dyn ToSql));
            bound.push(&limit);
            bound.push(&offset);

            let mut stmt = conn.prepare(&page_sql)?;
            let results = stmt
                .query_map(params_from_iter(bound), ticket_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(Page::new(u64::try_from(count).unwrap_or(0), page, results))
        })
        .await
        .map_err(map_tr_err)
}

enum RedirectOutcome {
    Redirected(Ticket),
    MissingTicket,
    MissingCounter,
}

/// Record `target` as the hand-off counter. Status, counter and called_at are untouched.
pub async fn redirect(
    db: &Database,
    ticket: TicketId,
    target: CounterId,
    carry_over: bool,
) -> Result<Ticket, TurnstileError> {
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let ticket_id = ticket.to_string();
            let target_id = target.to_string();
            let ticket_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM tickets WHERE id = ?1)",
                params![ticket_id],
                |row| row.get(0),
            )?;
            if !ticket_exists {
                return Ok(RedirectOutcome::MissingTicket);
            }
            if !counter_exists(&tx, &target_id)? {
                return Ok(RedirectOutcome::MissingCounter);
            }
            tx.execute(
                "UPDATE tickets SET redirect_to = ?1 WHERE id = ?2",
                params![target_id, ticket_id],
            )?;
            let updated =
                load_ticket(&tx, ticket, carry_over)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(RedirectOutcome::Redirected(updated))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        RedirectOutcome::Redirected(ticket) => Ok(ticket),
        RedirectOutcome::MissingTicket => Err(TurnstileError::not_found("ticket", ticket)),
        RedirectOutcome::MissingCounter => Err(TurnstileError::not_found("counter", target)),
    }
}
