// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The hub handle shared by the queue service and the gateway.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info_span, warn};
use turnstile_config::model::HubConfig;
use turnstile_core::BoardSnapshot;

use crate::dispatcher::{self, Envelope};
use crate::event::{AheadNotification, HubEvent, TicketServed};
use crate::registry::{Registry, Subscription};
use crate::topic::Topic;

/// Cheap-to-clone handle to the notification hub.
///
/// Constructed once at startup. The dispatcher task stops when the last
/// handle is dropped.
#[derive(Clone)]
pub struct NotificationHub {
    registry: Arc<Registry>,
    dispatch: mpsc::Sender<Envelope>,
}

impl NotificationHub {
    /// Create the hub and spawn its dispatcher. Must be called inside a Tokio runtime.
    pub fn new(config: &HubConfig) -> Self {
        let registry = Arc::new(Registry::new(config.subscriber_buffer));
        let (dispatch, rx) = mpsc::channel(config.dispatch_buffer.max(1));
        tokio::spawn(
            dispatcher::run(Arc::clone(&registry), rx).instrument(info_span!("hub_dispatcher")),
        );
        Self { registry, dispatch }
    }

    /// Queue an event for fan-out. Never blocks; drops the event if the
    /// dispatcher is saturated.
    pub fn publish(&self, topic: Topic, event: HubEvent) {
        match self.dispatch.try_send(Envelope::Publish(topic, event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%topic, "dispatch queue full, event dropped");
                metrics::counter!("turnstile_notifications_dropped_total", "reason" => "dispatch_full")
                    .increment(1);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(%topic, "dispatcher stopped, event dropped");
            }
        }
    }

    pub fn publish_ahead(&self, notification: AheadNotification) {
        self.publish(Topic::Ahead, HubEvent::Ahead(notification));
    }

    pub fn publish_ticket_served(&self, served: TicketServed) {
        self.publish(Topic::Ticket(served.ticket_id), HubEvent::TicketServed(served));
    }

    pub fn publish_board(&self, snapshot: BoardSnapshot) {
        self.publish(Topic::InProgressBoard, HubEvent::Board(snapshot));
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        self.registry.join(topic)
    }

    /// Join the board topic, receiving the newest known snapshot first.
    ///
    /// `seed` is a snapshot the caller read from the store; whichever of it
    /// and the last dispatched snapshot has the higher revision is sent.
    /// Later snapshots at or below that revision are not repeated.
    pub fn subscribe_board(&self, seed: Option<BoardSnapshot>) -> Subscription {
        self.registry.join_with(Topic::InProgressBoard, move |registry| {
            let cached = registry.latest_board().clone();
            let initial = match (cached, seed) {
                (Some(cached), Some(seed)) if seed.revision > cached.revision => seed,
                (Some(cached), _) => cached,
                (None, seed) => seed?,
            };
            let revision = initial.revision;
            let payload = serde_json::to_string(&HubEvent::Board(initial)).ok()?;
            Some((payload, revision))
        })
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.registry.count(topic)
    }

    /// Last board snapshot accepted by the dispatcher.
    pub fn latest_board(&self) -> Option<BoardSnapshot> {
        self.registry.latest_board().clone()
    }

    /// Wait until every event published before this call has been fanned out.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.dispatch.send(Envelope::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}
