// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Mempool controller scenarios: operations flow from the prefilter into the pool
//! while heads are notified.

use super::tools::*;
use crate::start_mempool_controller;
use assert_matches::assert_matches;
use std::sync::Arc;
use std::thread;
use tenderbake_models::{level::Level, operation::Contents, operation::Operation};
use tenderbake_pool_exports::{
    ConsensusFilter, FilterConfig, ManagerOperationResult, PrefilterOutcome, Priority,
    RefusalReason,
};

#[test]
fn test_controller_filters_against_notified_head() {
    let controller =
        start_mempool_controller(FilterConfig::default(), Arc::new(tenderbake_protocol()));

    // before any head, consensus operations are not judged on time
    let early = endorsement(100, round(50));
    let outcomes = controller.add_operations(vec![early.clone()], HEAD_TIMESTAMP);
    assert_eq!(
        outcomes,
        vec![(early.id, PrefilterOutcome::PassedPrefilter(Priority::Consensus))]
    );
    assert_eq!(controller.get_operation_count(), 1);

    controller.notify_new_head(&head(100, round(0), round(0), HEAD_TIMESTAMP));
    // the pool is kept across heads
    assert_eq!(controller.get_operation_count(), 1);

    let future = endorsement(100, round(40));
    let current = endorsement(100, round(1));
    let past = endorsement(99, round(0));
    let outcomes = controller.add_operations(
        vec![future.clone(), current.clone(), past.clone()],
        HEAD_TIMESTAMP,
    );
    assert_eq!(
        outcomes,
        vec![
            (
                future.id,
                PrefilterOutcome::BranchRefused(RefusalReason::ConsensusOperationInTheFuture {
                    level: Level::new(100),
                    round: round(40),
                })
            ),
            (
                current.id,
                PrefilterOutcome::PassedPrefilter(Priority::Consensus)
            ),
            (past.id, PrefilterOutcome::PassedPrefilter(Priority::Consensus)),
        ]
    );
    assert_eq!(controller.get_operation_count(), 3);

    // a genesis-like head turns the filter off
    controller.notify_new_head(&genesis_head());
    let outcomes = controller.add_operations(vec![future.clone()], HEAD_TIMESTAMP);
    assert_eq!(
        outcomes[0].1,
        PrefilterOutcome::PassedPrefilter(Priority::Consensus)
    );
    assert_eq!(controller.get_operation_count(), 4);
}

#[test]
fn test_controller_refuses_and_keeps_the_pool_unchanged() {
    let controller =
        start_mempool_controller(FilterConfig::default(), Arc::new(tenderbake_protocol()));
    let cheap = manager_op(1, 1_500, 100);
    let noop = Operation::new(branch(), vec![Contents::FailingNoop(vec![1])], 10).unwrap();
    let vote = ballot_op(2);

    let outcomes = controller.add_operations(vec![cheap, noop, vote], HEAD_TIMESTAMP);
    let outcomes: Vec<_> = outcomes.into_iter().map(|(_, outcome)| outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            PrefilterOutcome::Refused(RefusalReason::FeesTooLow),
            PrefilterOutcome::Refused(RefusalReason::FailingNoop),
            PrefilterOutcome::Undecided,
        ]
    );
    assert_eq!(controller.get_operation_count(), 1);
}

#[test]
fn test_controller_refuses_operations_without_validation_pass() {
    let controller = start_mempool_controller(
        FilterConfig::default(),
        Arc::new(mock_protocol_with_passes(vec![0, 1])),
    );
    let vote = ballot_op(2);
    let outcomes = controller.add_operations(vec![vote.clone()], HEAD_TIMESTAMP);
    assert_eq!(
        outcomes,
        vec![(
            vote.id,
            PrefilterOutcome::Refused(RefusalReason::NoValidationPass)
        )]
    );
    assert_eq!(controller.get_operation_count(), 0);
}

#[test]
fn test_controller_ordered_and_relevant_operations() {
    let controller = start_mempool_controller(
        FilterConfig::free_fees(None),
        Arc::new(tenderbake_protocol()),
    );
    let candidate = payload(b"payload");
    let relevant = endorsement(100, round(0));
    let stale = endorsement(99, round(0));
    let manager = manager_op(0, 1_000, 100);
    let vote = ballot_op(1);
    controller.add_operations(
        vec![manager.clone(), stale.clone(), vote.clone(), relevant.clone()],
        HEAD_TIMESTAMP,
    );

    let ordered = controller.get_ordered_operations();
    assert_eq!(ordered.len(), 4);
    assert_eq!(ordered[0].len(), 2);
    assert_eq!(ordered[1], vec![vote.clone()]);
    assert!(ordered[2].is_empty());
    assert_eq!(ordered[3], vec![manager.clone()]);
    // the clone shares the pool
    assert_eq!(controller.clone().get_ordered_operations(), ordered);

    let relevant_ops = controller.get_relevant_operations(
        ConsensusFilter {
            level: Level::new(100),
            round: round(0),
            payload_hash: candidate,
        },
        None,
    );
    assert_eq!(relevant_ops[0], vec![relevant]);
    assert_eq!(relevant_ops[1], vec![vote]);
    assert_eq!(relevant_ops[3], vec![manager.clone()]);

    controller.remove_operations(&[stale.id, manager.id]);
    assert_eq!(controller.get_operation_count(), 2);
}

#[test]
fn test_controller_post_filter() {
    let controller = start_mempool_controller(
        FilterConfig {
            allow_script_failure: false,
            ..Default::default()
        },
        Arc::new(tenderbake_protocol()),
    );
    let op = manager_op(1_000, 1_500, 100);
    assert!(controller.post_filter(&op, &[ManagerOperationResult::Applied]));
    assert!(!controller.post_filter(
        &op,
        &[ManagerOperationResult::Applied, ManagerOperationResult::Skipped]
    ));
}

#[test]
fn test_controller_flush_empties_the_pool() {
    let controller = start_mempool_controller(
        FilterConfig::free_fees(None),
        Arc::new(tenderbake_protocol()),
    );
    controller.notify_new_head(&head(100, round(0), round(0), HEAD_TIMESTAMP));
    let ops = vec![endorsement(100, round(0)), ballot_op(1), manager_op(0, 1_000, 100)];
    controller.add_operations(ops, HEAD_TIMESTAMP);
    assert_eq!(controller.get_operation_count(), 3);

    controller.clone_box().flush();
    assert_eq!(controller.get_operation_count(), 0);
    assert!(controller
        .get_ordered_operations()
        .iter()
        .all(|ops| ops.is_empty()));

    // the filter still judges against the notified head
    let future = endorsement(100, round(40));
    let outcomes = controller.add_operations(vec![future], HEAD_TIMESTAMP);
    assert_matches!(outcomes[0].1, PrefilterOutcome::BranchRefused(_));
    assert_eq!(controller.get_operation_count(), 0);
}

#[test]
fn test_controller_shared_across_threads() {
    let controller =
        start_mempool_controller(FilterConfig::default(), Arc::new(tenderbake_protocol()));
    let future = endorsement(100, round(40));
    let refused = PrefilterOutcome::BranchRefused(RefusalReason::ConsensusOperationInTheFuture {
        level: Level::new(100),
        round: round(40),
    });
    let passed = PrefilterOutcome::PassedPrefilter(Priority::Consensus);

    let notifier = controller.clone_box();
    let writer = thread::spawn(move || {
        for i in 0..200 {
            if i % 2 == 0 {
                notifier.notify_new_head(&genesis_head());
            } else {
                notifier.notify_new_head(&head(100, round(0), round(0), HEAD_TIMESTAMP));
            }
        }
    });
    let adder = controller.clone_box();
    let reader = thread::spawn(move || {
        let mut outcomes = Vec::new();
        for _ in 0..200 {
            outcomes.extend(adder.add_operations(vec![future.clone()], HEAD_TIMESTAMP));
        }
        outcomes
    });

    writer.join().unwrap();
    let outcomes = reader.join().unwrap();
    assert_eq!(outcomes.len(), 200);
    for (_, outcome) in outcomes {
        assert!(
            outcome == passed || outcome == refused,
            "unexpected outcome {:?}",
            outcome
        );
    }
    // the same operation is stored at most once
    assert!(controller.get_operation_count() <= 1);

    // the last notified head is a real one
    let outcomes = controller.add_operations(vec![endorsement(100, round(40))], HEAD_TIMESTAMP);
    assert_eq!(outcomes[0].1, refused);
}
