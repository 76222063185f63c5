// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic membership.
//!
//! Joining and leaving take the topic's shard write lock; the dispatcher
//! delivers under the read lock, so a join never interleaves with a
//! delivery to the same topic. The board topic entry is created up front
//! and never removed, which keeps that guarantee for the board even while
//! it has no members.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use tokio::sync::mpsc;
use turnstile_core::BoardSnapshot;

use crate::topic::Topic;

/// Identifier of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

pub(crate) struct Member {
    pub(crate) mailbox: mpsc::Sender<String>,
    /// Board snapshots at or below this revision were already handed to the member.
    pub(crate) board_floor: u64,
}

pub(crate) struct Registry {
    pub(crate) topics: DashMap<Topic, HashMap<SubscriberId, Member>>,
    /// Last board snapshot accepted by the dispatcher.
    latest_board: Mutex<Option<BoardSnapshot>>,
    next_id: AtomicU64,
    mailbox_capacity: usize,
}

impl Registry {
    pub(crate) fn new(mailbox_capacity: usize) -> Self {
        let topics = DashMap::new();
        topics.insert(Topic::InProgressBoard, HashMap::new());
        Self {
            topics,
            latest_board: Mutex::new(None),
            next_id: AtomicU64::new(1),
            mailbox_capacity: mailbox_capacity.max(1),
        }
    }

    pub(crate) fn latest_board(&self) -> MutexGuard<'_, Option<BoardSnapshot>> {
        self.latest_board
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn join(self: &Arc<Self>, topic: Topic) -> Subscription {
        self.join_with(topic, |_| None)
    }

    /// Join `topic`, letting `seed` push an initial payload into the new
    /// mailbox while the topic's write lock is held.
    ///
    /// `seed` returns the board floor to record alongside the payload.
    pub(crate) fn join_with(
        self: &Arc<Self>,
        topic: Topic,
        seed: impl FnOnce(&Self) -> Option<(String, u64)>,
    ) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (mailbox, rx) = mpsc::channel(self.mailbox_capacity);

        let mut members = self.topics.entry(topic).or_default();
        let mut board_floor = 0;
        if let Some((payload, floor)) = seed(self) {
            // Capacity is at least one and nobody else holds this sender yet.
            let _ = mailbox.try_send(payload);
            board_floor = floor;
        }
        members.insert(
            id,
            Member {
                mailbox,
                board_floor,
            },
        );
        drop(members);
        self.record_subscribers();

        Subscription {
            id,
            topic,
            rx,
            registry: Arc::clone(self),
        }
    }

    /// Remove a member. Leaving twice, or leaving an unknown topic, is a no-op.
    pub(crate) fn leave(&self, topic: &Topic, id: SubscriberId) {
        let removed = self
            .topics
            .get_mut(topic)
            .and_then(|mut members| members.remove(&id))
            .is_some();
        if *topic != Topic::InProgressBoard {
            self.topics.remove_if(topic, |_, members| members.is_empty());
        }
        if removed {
            self.record_subscribers();
        }
    }

    pub(crate) fn count(&self, topic: &Topic) -> usize {
        self.topics.get(topic).map_or(0, |members| members.len())
    }

    fn record_subscribers(&self) {
        let total: usize = self.topics.iter().map(|entry| entry.value().len()).sum();
        metrics::gauge!("turnstile_hub_subscribers").set(total as f64);
    }
}

/// Membership in one topic. Dropping it leaves the topic.
pub struct Subscription {
    id: SubscriberId,
    topic: Topic,
    rx: mpsc::Receiver<String>,
    registry: Arc<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Next serialized event, or `None` once the hub has shut down.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Leave the topic now. Equivalent to dropping the subscription.
    pub fn leave(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.leave(&self.topic, self.id);
    }
}
