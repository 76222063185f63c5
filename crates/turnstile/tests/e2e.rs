// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the queue workflow.
//!
//! Each test creates an isolated TestHarness with temp SQLite, a live
//! notification hub and a manual clock. Tests are independent and
//! order-insensitive.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use turnstile_core::{
    AgentId, Assignment, CallOutcome, CounterId, PageRequest, Ticket, TicketFilter, TicketId,
    TicketStatus,
};
use turnstile_hub::{HubEvent, Topic};
use turnstile_test_utils::TestHarness;
use turnstile_test_utils::fixtures::{AGENT_ONE, AGENT_TWO, CASHIER_AGENT};

fn called(outcome: CallOutcome) -> Assignment {
    match outcome {
        CallOutcome::Called(assignment) => *assignment,
        CallOutcome::QueueEmpty => panic!("expected a ticket to be called"),
    }
}

async fn all_tickets(harness: &TestHarness) -> Vec<Ticket> {
    harness
        .queue
        .list_tickets(
            TicketFilter::default(),
            PageRequest::new(Some(1), Some(PageRequest::MAX_PAGE_SIZE)),
        )
        .await
        .unwrap()
        .results
}

// ---- Numbering ----

#[tokio::test]
async fn first_tickets_of_the_day_are_a1_and_a2() {
    let harness = TestHarness::new().await.unwrap();
    let first = harness.issue(harness.directory.licensing, "Ada").await.unwrap();
    let second = harness.issue(harness.directory.licensing, "Grace").await.unwrap();
    assert_eq!(first.number, "A-1");
    assert_eq!(second.number, "A-2");
    assert_eq!(first.status, TicketStatus::Waiting);
    assert!(first.called_at.is_none());
}

// ---- FIFO call-next ----

#[tokio::test]
async fn call_next_serves_in_creation_order() {
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let harness = TestHarness::builder().starting_at(start).build().await.unwrap();
    let queue = &harness.queue;
    let licensing = harness.directory.licensing;

    let t1 = queue
        .issue_ticket(turnstile_test_utils::new_ticket(licensing, "T1"))
        .await
        .unwrap();
    harness.advance(Duration::minutes(5));
    let t2 = queue
        .issue_ticket(turnstile_test_utils::new_ticket(licensing, "T2"))
        .await
        .unwrap();

    let first = called(harness.call(AGENT_ONE).await.unwrap());
    assert_eq!(first.ticket.id, t1.id);

    let second = called(harness.call(AGENT_ONE).await.unwrap());
    assert_eq!(second.ticket.id, t2.id);
    assert_eq!(second.completed, Some(t1.id));

    let t1 = queue.get_ticket(t1.id).await.unwrap();
    assert_eq!(t1.status, TicketStatus::Completed);
    assert_eq!(t1.counter, Some(harness.directory.counter_one));
    assert_eq!(t1.served_by, Some(AgentId::from(AGENT_ONE)));
}

// ---- Empty queue ----

#[tokio::test]
async fn empty_queue_mutates_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let current = harness.issue(harness.directory.licensing, "Ada").await.unwrap();
    let payments = harness.issue(harness.directory.payments, "Cash").await.unwrap();
    called(harness.call(AGENT_ONE).await.unwrap());
    let before = all_tickets(&harness).await;

    // Counter one only serves the front office; the payments ticket is not eligible.
    assert!(matches!(
        harness.call(AGENT_ONE).await.unwrap(),
        CallOutcome::QueueEmpty
    ));

    let after = all_tickets(&harness).await;
    assert_eq!(before, after);
    let current = harness.queue.get_ticket(current.id).await.unwrap();
    assert_eq!(current.status, TicketStatus::InProgress);
    let payments = harness.queue.get_ticket(payments.id).await.unwrap();
    assert_eq!(payments.status, TicketStatus::Waiting);
}

// ---- Redirect ----

#[tokio::test]
async fn redirect_leaves_status_and_counter() {
    let harness = TestHarness::new().await.unwrap();
    let t3 = harness.issue(harness.directory.licensing, "T3").await.unwrap();
    let before = called(harness.call(AGENT_ONE).await.unwrap()).ticket;

    let after = harness
        .queue
        .redirect(t3.id, harness.directory.counter_two)
        .await
        .unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.counter, before.counter);
    assert_eq!(after.called_at, before.called_at);
    assert_eq!(after.redirect_to, Some(harness.directory.counter_two));

    // Redirecting a waiting ticket leaves it waiting and uncalled.
    let waiting = harness.issue(harness.directory.licensing, "W").await.unwrap();
    let marked = harness
        .queue
        .redirect(waiting.id, harness.directory.spare)
        .await
        .unwrap();
    assert_eq!(marked.status, TicketStatus::Waiting);
    assert!(marked.called_at.is_none());
    assert!(marked.counter.is_none());
}

// ---- Board delivery ----

#[tokio::test]
async fn only_connected_board_subscribers_receive_snapshots() {
    let harness = TestHarness::new().await.unwrap();
    let ticket = harness.issue(harness.directory.licensing, "Ada").await.unwrap();

    let mut connected = harness.hub.subscribe_board(None);
    let gone = harness.hub.subscribe_board(None);
    gone.leave();
    let mut elsewhere = harness.hub.subscribe(Topic::Ticket(TicketId::new()));

    called(harness.call(AGENT_ONE).await.unwrap());
    harness.hub.flush().await;

    let payload = connected.try_recv().expect("connected subscriber gets the board");
    match serde_json::from_str::<HubEvent>(&payload).unwrap() {
        HubEvent::Board(snapshot) => {
            assert_eq!(snapshot.entries.len(), 1);
            assert_eq!(snapshot.entries[0].ticket_number, ticket.number);
            assert_eq!(snapshot.entries[0].counter_number, 1);
            assert_eq!(snapshot.entries[0].status, TicketStatus::InProgress);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(elsewhere.try_recv().is_none());
    assert_eq!(harness.hub.subscriber_count(&Topic::InProgressBoard), 1);

    // A subscriber joining later starts from the current board, not a backlog.
    let mut late = harness.hub.subscribe_board(None);
    let first = late.try_recv().expect("current board on connect");
    assert!(first.contains(&ticket.number));
    assert!(late.try_recv().is_none());
}

#[tokio::test]
async fn board_snapshots_follow_commit_order() {
    let harness = TestHarness::new().await.unwrap();
    for name in ["a", "b", "c", "d"] {
        harness.issue(harness.directory.licensing, name).await.unwrap();
    }
    let mut board = harness.hub.subscribe_board(None);
    for agent in [AGENT_ONE, AGENT_TWO, AGENT_ONE, AGENT_TWO] {
        called(harness.call(agent).await.unwrap());
    }
    harness.hub.flush().await;

    let mut revisions = Vec::new();
    while let Some(payload) = board.try_recv() {
        if let HubEvent::Board(snapshot) = serde_json::from_str(&payload).unwrap() {
            assert!(snapshot.entries.len() <= 2);
            revisions.push(snapshot.revision);
        }
    }
    assert_eq!(revisions.len(), 4);
    assert!(revisions.windows(2).all(|w| w[0] < w[1]));
}

// ---- Day boundary ----

#[tokio::test]
async fn yesterdays_waiting_tickets_are_not_called_by_default() {
    let harness = TestHarness::new().await.unwrap();
    harness.issue(harness.directory.licensing, "yesterday").await.unwrap();
    harness.advance(Duration::days(1));

    assert!(matches!(
        harness.call(AGENT_ONE).await.unwrap(),
        CallOutcome::QueueEmpty
    ));
    let today = harness.issue(harness.directory.licensing, "today").await.unwrap();
    assert_eq!(today.number, "A-1");
    assert_eq!(called(harness.call(AGENT_ONE).await.unwrap()).ticket.id, today.id);
}

#[tokio::test]
async fn carry_over_reaches_earlier_days_first() {
    let harness = TestHarness::builder().with_carry_over().build().await.unwrap();
    let old = harness.issue(harness.directory.licensing, "yesterday").await.unwrap();
    harness.advance(Duration::days(1));
    let new = harness.issue(harness.directory.licensing, "today").await.unwrap();
    assert_eq!(new.number, "A-1");
    assert_ne!(new.business_day, old.business_day);

    assert_eq!(called(harness.call(AGENT_ONE).await.unwrap()).ticket.id, old.id);
    assert_eq!(called(harness.call(AGENT_ONE).await.unwrap()).ticket.id, new.id);
}

#[tokio::test]
async fn business_day_follows_site_offset() {
    // 22:30 UTC is already the next day four hours east.
    let start = Utc.with_ymd_and_hms(2026, 3, 2, 22, 30, 0).unwrap();
    let harness = TestHarness::builder()
        .starting_at(start)
        .with_utc_offset_minutes(240)
        .build()
        .await
        .unwrap();
    let ticket = harness.issue(harness.directory.licensing, "late").await.unwrap();
    assert_eq!(ticket.business_day.to_string(), "2026-03-03");
}

// ---- Estimates ----

#[tokio::test]
async fn estimates_track_position_and_average_wait() {
    let harness = TestHarness::new().await.unwrap();
    let licensing = harness.directory.licensing;
    let first = harness.issue(licensing, "a").await.unwrap();
    let second = harness.issue(licensing, "b").await.unwrap();
    let third = harness.issue(licensing, "c").await.unwrap();
    assert_eq!(third.customers_ahead, 2);
    assert_eq!(third.avg_wait_time_secs, 0.0);

    // Issued at 08:01, called at 08:05.
    harness.advance(Duration::minutes(1));
    called(harness.call(AGENT_ONE).await.unwrap());
    let first = harness.queue.get_ticket(first.id).await.unwrap();
    let waited = (first.called_at.unwrap() - first.created_at).num_seconds();
    assert_eq!(waited, 240);

    // The first ticket completes on the next call.
    called(harness.call(AGENT_ONE).await.unwrap());
    let third = harness.queue.get_ticket(third.id).await.unwrap();
    assert_eq!(third.customers_ahead, 0);
    assert!((third.avg_wait_time_secs - 240.0).abs() < 0.01);
    assert_eq!(
        harness.queue.get_ticket(second.id).await.unwrap().status,
        TicketStatus::InProgress
    );
}

// ---- Concurrency ----

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_counters_never_share_a_ticket() {
    let harness = TestHarness::new().await.unwrap();
    for n in 0..15 {
        harness.issue(harness.directory.licensing, &format!("front {n}")).await.unwrap();
        harness.issue(harness.directory.payments, &format!("cash {n}")).await.unwrap();
    }

    let mut tasks = Vec::new();
    for agent in [AGENT_ONE, AGENT_TWO, CASHIER_AGENT] {
        let queue = Arc::clone(&harness.queue);
        tasks.push(tokio::spawn(async move {
            let agent = AgentId::from(agent);
            let mut served = Vec::new();
            loop {
                match queue.call_next(&agent, None).await {
                    Ok(CallOutcome::Called(a)) => served.push((a.ticket.id, a.ticket.service)),
                    Ok(CallOutcome::QueueEmpty) => break,
                    Err(e) if e.is_transient() => continue,
                    Err(e) => panic!("{e}"),
                }
            }
            served
        }));
    }

    let mut seen = HashSet::new();
    let results = futures::future::join_all(tasks).await;
    for (i, result) in results.into_iter().enumerate() {
        for (ticket, service) in result.unwrap() {
            assert!(seen.insert(ticket), "ticket {ticket} served twice");
            if i == 2 {
                assert_eq!(service, harness.directory.payments);
            } else {
                assert_ne!(service, harness.directory.payments);
            }
        }
    }
    assert_eq!(seen.len(), 30);

    let in_progress = harness.queue.list_in_progress(PageRequest::default()).await.unwrap();
    assert_eq!(in_progress.count, 3);
}

// ---- Random operation sequences ----

#[derive(Debug, Clone)]
enum Op {
    Issue(usize),
    Call(usize),
    Redirect(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3).prop_map(Op::Issue),
        3 => (0usize..3).prop_map(Op::Call),
        1 => (0usize..64, 0usize..4).prop_map(|(t, c)| Op::Redirect(t, c)),
    ]
}

async fn run_ops(ops: Vec<Op>) {
    let harness = TestHarness::new().await.unwrap();
    let dir = &harness.directory;
    let services = [dir.licensing, dir.renewals, dir.payments];
    let agents = [AGENT_ONE, AGENT_TWO, CASHIER_AGENT];
    let counters = [dir.counter_one, dir.counter_two, dir.cashier, dir.spare];

    let mut issued: Vec<TicketId> = Vec::new();
    let mut current: HashMap<usize, TicketId> = HashMap::new();
    let mut called_ever: HashSet<TicketId> = HashSet::new();

    for op in ops {
        match op {
            Op::Issue(s) => {
                let ticket = harness.issue(services[s], "prop").await.unwrap();
                issued.push(ticket.id);
            }
            Op::Call(a) => {
                let before = all_tickets(&harness).await;
                match harness.call(agents[a]).await.unwrap() {
                    CallOutcome::Called(assignment) => {
                        assert!(called_ever.insert(assignment.ticket.id), "ticket called twice");
                        assert_eq!(assignment.completed, current.get(&a).copied());
                        let after = all_tickets(&harness).await;
                        let newly_completed: Vec<_> = after
                            .iter()
                            .filter(|t| t.status == TicketStatus::Completed)
                            .filter(|t| {
                                before
                                    .iter()
                                    .any(|b| b.id == t.id && b.status != TicketStatus::Completed)
                            })
                            .map(|t| t.id)
                            .collect();
                        assert_eq!(newly_completed, current.get(&a).copied().into_iter().collect::<Vec<_>>());
                        current.insert(a, assignment.ticket.id);
                    }
                    CallOutcome::QueueEmpty => {
                        assert_eq!(before, all_tickets(&harness).await);
                    }
                }
            }
            Op::Redirect(t, c) => {
                let Some(id) = issued.get(t % issued.len().max(1)).copied() else {
                    continue;
                };
                let before = harness.queue.get_ticket(id).await.unwrap();
                let after = harness.queue.redirect(id, counters[c]).await.unwrap();
                assert_eq!(after.status, before.status);
                assert_eq!(after.counter, before.counter);
                assert_eq!(after.called_at, before.called_at);
            }
        }

        // At most one in-progress ticket per counter; called_at set iff not waiting.
        let tickets = all_tickets(&harness).await;
        let mut per_counter: HashMap<CounterId, usize> = HashMap::new();
        for t in &tickets {
            assert_eq!(t.called_at.is_some(), t.status != TicketStatus::Waiting);
            if t.status == TicketStatus::InProgress {
                *per_counter.entry(t.counter.unwrap()).or_default() += 1;
            }
        }
        assert!(per_counter.values().all(|n| *n == 1));
    }

    // Numbers per service run 1..=n without gaps.
    let tickets = all_tickets(&harness).await;
    for service in services {
        let mut numbers: Vec<u32> = tickets
            .iter()
            .filter(|t| t.service == service)
            .map(|t| turnstile_core::numbering::parse_sequence(&t.number).unwrap())
            .collect();
        numbers.sort_unstable();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn random_operations_preserve_queue_invariants(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run_ops(ops));
    }
}
