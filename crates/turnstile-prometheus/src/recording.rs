// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions.

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

pub const TICKETS_ISSUED: &str = "turnstile_tickets_issued_total";
pub const TICKETS_CALLED: &str = "turnstile_tickets_called_total";
pub const QUEUE_EMPTY: &str = "turnstile_queue_empty_total";
pub const CALL_CONFLICTS: &str = "turnstile_call_conflicts_total";
pub const WAIT_SECONDS: &str = "turnstile_wait_seconds";
pub const NOTIFICATIONS_DROPPED: &str = "turnstile_notifications_dropped_total";
pub const HUB_SUBSCRIBERS: &str = "turnstile_hub_subscribers";

/// Register all Turnstile metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(TICKETS_ISSUED, "Tickets issued");
    describe_counter!(TICKETS_CALLED, "Tickets called to a counter");
    describe_counter!(QUEUE_EMPTY, "Call-next requests that found no eligible ticket");
    describe_counter!(
        CALL_CONFLICTS,
        "Call-next transactions that lost the compare-and-set"
    );
    describe_histogram!(
        WAIT_SECONDS,
        Unit::Seconds,
        "Time between issue and call"
    );
    describe_counter!(
        NOTIFICATIONS_DROPPED,
        "Hub events dropped, labelled by reason"
    );
    describe_gauge!(HUB_SUBSCRIBERS, "Current hub subscriptions across all topics");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_without_recorder_is_a_no_op() {
        register_metrics();
    }

    #[test]
    fn metric_names_share_prefix() {
        for name in [
            TICKETS_ISSUED,
            TICKETS_CALLED,
            QUEUE_EMPTY,
            CALL_CONFLICTS,
            WAIT_SECONDS,
            NOTIFICATIONS_DROPPED,
            HUB_SUBSCRIBERS,
        ] {
            assert!(name.starts_with("turnstile_"), "{name}");
        }
    }
}
