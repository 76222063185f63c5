// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite columns and the core domain types.
//!
//! Timestamps are stored as fixed-width UTC text so that lexical order is
//! chronological order; ids are stored as hyphenated UUID text.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use turnstile_core::{
    AgentId, CounterId, CustomerContact, ServiceId, Ticket, TicketId, TicketStatus,
};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Ticket projection with estimates. `?1` binds the carry-over flag.
///
/// `customers_ahead` counts waiting tickets of the same service issued
/// before this one (insertion order breaks created_at ties); without
/// carry-over only the ticket's own business day counts. `avg_wait` is the
/// mean issue-to-call time, in seconds, of completed tickets of the service
/// created before this one.
pub(crate) const TICKET_SELECT: &str = "
    SELECT t.id, t.number, t.service_id, s.name, s.name_ar, s.symbol,
           t.business_day, t.status, t.created_at, t.called_at,
           t.counter_id, c.number, t.redirect_to, t.served_by, t.hold_reason,
           t.customer_name, t.customer_name_ar, t.nationality, t.mobile_number, t.email,
           (SELECT COUNT(*) FROM tickets a
             WHERE a.service_id = t.service_id
               AND a.called_at IS NULL
               AND (a.created_at < t.created_at
                    OR (a.created_at = t.created_at AND a.seq < t.seq))
               AND (?1 OR a.business_day = t.business_day)) AS customers_ahead,
           (SELECT AVG((julianday(d.called_at) - julianday(d.created_at)) * 86400.0)
              FROM tickets d
             WHERE d.service_id = t.service_id
               AND d.status = 'completed'
               AND d.called_at IS NOT NULL
               AND d.created_at < t.created_at) AS avg_wait
      FROM tickets t
      JOIN services s ON s.id = t.service_id
      LEFT JOIN counters c ON c.id = t.counter_id";

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

pub(crate) fn uuid_column<T: From<Uuid>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map(T::from)
        .map_err(|e| conversion_error(idx, e))
}

fn optional_uuid_column<T: From<Uuid>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| {
            Uuid::parse_str(&raw)
                .map(T::from)
                .map_err(|e| conversion_error(idx, e))
        })
        .transpose()
}

/// Map a row produced by [`TICKET_SELECT`].
pub(crate) fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let business_day: String = row.get(6)?;
    let status: String = row.get(7)?;
    let created_at: String = row.get(8)?;
    let called_at: Option<String> = row.get(9)?;
    let ahead: i64 = row.get(20)?;
    let avg_wait: Option<f64> = row.get(21)?;

    Ok(Ticket {
        id: uuid_column::<TicketId>(row, 0)?,
        number: row.get(1)?,
        service: uuid_column::<ServiceId>(row, 2)?,
        service_name: row.get(3)?,
        service_name_ar: row.get(4)?,
        service_symbol: row.get(5)?,
        business_day: NaiveDate::from_str(&business_day).map_err(|e| conversion_error(6, e))?,
        status: TicketStatus::from_str(&status).map_err(|e| conversion_error(7, e))?,
        created_at: parse_timestamp(8, &created_at)?,
        called_at: called_at
            .as_deref()
            .map(|raw| parse_timestamp(9, raw))
            .transpose()?,
        counter: optional_uuid_column::<CounterId>(row, 10)?,
        counter_number: row.get(11)?,
        redirect_to: optional_uuid_column::<CounterId>(row, 12)?,
        served_by: row.get::<_, Option<String>>(13)?.map(AgentId),
        hold_reason: row.get(14)?,
        customer: CustomerContact {
            customer_name: row.get(15)?,
            customer_name_ar: row.get(16)?,
            nationality: row.get(17)?,
            mobile_number: row.get(18)?,
            email: row.get(19)?,
        },
        customers_ahead: u64::try_from(ahead).unwrap_or(0),
        avg_wait_time_secs: avg_wait.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 1, 9, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
    }

    #[test]
    fn timestamps_parse_back() {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 15).unwrap()
            + chrono::Duration::microseconds(250);
        let text = format_timestamp(at);
        assert_eq!(parse_timestamp(0, &text).unwrap(), at);
    }
}
