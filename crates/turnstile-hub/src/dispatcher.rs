// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fan-out task.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use turnstile_core::BoardSnapshot;

use crate::event::HubEvent;
use crate::registry::{Member, Registry};
use crate::topic::Topic;

pub(crate) enum Envelope {
    Publish(Topic, HubEvent),
    /// Acknowledged once every envelope queued before it has been handled.
    Flush(oneshot::Sender<()>),
}

/// Runs until every hub handle is dropped.
pub(crate) async fn run(registry: Arc<Registry>, mut rx: mpsc::Receiver<Envelope>) {
    while let Some(envelope) = rx.recv().await {
        match envelope {
            Envelope::Publish(Topic::InProgressBoard, HubEvent::Board(snapshot)) => {
                deliver_board(&registry, snapshot);
            }
            Envelope::Publish(topic, event) => deliver(&registry, topic, &event),
            Envelope::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("notification dispatcher stopped");
}

fn deliver(registry: &Registry, topic: Topic, event: &HubEvent) {
    let Some(members) = registry.topics.get(&topic) else {
        debug!(%topic, "no subscribers");
        return;
    };
    let Some(payload) = encode(event) else {
        return;
    };
    for member in members.values() {
        offer(&topic, member, &payload);
    }
}

/// Board snapshots are delivered in revision order; anything not newer than
/// the last accepted snapshot is dropped.
fn deliver_board(registry: &Registry, snapshot: BoardSnapshot) {
    let topic = Topic::InProgressBoard;
    let members = registry.topics.get(&topic);

    {
        let mut latest = registry.latest_board();
        if latest
            .as_ref()
            .is_some_and(|current| current.revision >= snapshot.revision)
        {
            debug!(revision = snapshot.revision, "stale board snapshot skipped");
            return;
        }
        *latest = Some(snapshot.clone());
    }

    let Some(members) = members else {
        return;
    };
    let revision = snapshot.revision;
    let Some(payload) = encode(&HubEvent::Board(snapshot)) else {
        return;
    };
    for member in members.values().filter(|m| m.board_floor < revision) {
        offer(&topic, member, &payload);
    }
}

fn encode(event: &HubEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(error = %e, "failed to encode hub event");
            None
        }
    }
}

fn offer(topic: &Topic, member: &Member, payload: &str) {
    match member.mailbox.try_send(payload.to_string()) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(%topic, "subscriber mailbox full, event dropped");
            metrics::counter!("turnstile_notifications_dropped_total", "reason" => "mailbox_full")
                .increment(1);
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!(%topic, "subscriber gone, event dropped");
            metrics::counter!("turnstile_notifications_dropped_total", "reason" => "closed")
                .increment(1);
        }
    }
}
