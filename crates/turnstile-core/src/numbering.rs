// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket number rules.
//!
//! Numbers look like `<symbol>-<sequence>`, e.g. `A-12`. The sequence restarts
//! every business day; the day itself is not part of the string. Stores look
//! up the highest sequence issued for the service and day and feed it to
//! [`next_sequence`] inside the same transaction as the insert. Issue times
//! play no part, so a clock stepping backwards cannot reuse a number.

/// Extract the trailing sequence from a ticket number (the integer after the last `-`).
pub fn parse_sequence(number: &str) -> Option<u32> {
    let (_, tail) = number.rsplit_once('-')?;
    tail.parse().ok()
}

/// Sequence for the next ticket given the highest sequence issued today, if any.
pub fn next_sequence(highest: Option<u32>) -> u32 {
    highest.map_or(1, |n| n.saturating_add(1))
}

/// Compose a ticket number.
pub fn format_number(symbol: &str, sequence: u32) -> String {
    format!("{symbol}-{sequence}")
}

/// Prefix every number of a service starts with.
pub fn number_prefix(symbol: &str) -> String {
    format!("{symbol}-")
}

/// Short form shown on displays: the first and last segments only.
///
/// `A-12` stays `A-12`; legacy dated numbers such as `A-20240101-12` shorten to `A-12`.
pub fn display_number(number: &str) -> String {
    match (number.split_once('-'), number.rsplit_once('-')) {
        (Some((head, _)), Some((_, tail))) => format!("{head}-{tail}"),
        _ => number.to_string(),
    }
}
