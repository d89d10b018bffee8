// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::filter::{self, FilterState};
use crate::operation_pool::{classify, OperationPool, OrderedPool, PoolBucket};
use parking_lot::RwLock;
use std::sync::Arc;
use tenderbake_logging::tenderbake_trace;
use tenderbake_models::{
    block_header::BlockHeader, hash::OperationId, operation::Operation, protocol::ProtocolView,
};
use tenderbake_pool_exports::{
    ConsensusFilter, FilterConfig, ManagerOperationResult, MempoolController, PrefilterOutcome,
    RefusalReason,
};
use tenderbake_time::Timestamp;
use tracing::debug;

/// Shared handle on the mempool: filter state and operation pool
#[derive(Clone)]
pub struct MempoolControllerImpl {
    pub(crate) config: FilterConfig,
    pub(crate) protocol: Arc<dyn ProtocolView>,
    pub(crate) filter_state: Arc<RwLock<FilterState>>,
    pub(crate) operation_pool: Arc<RwLock<OperationPool>>,
}

impl MempoolControllerImpl {
    fn filter_snapshot(&self) -> FilterState {
        *self.filter_state.read()
    }
}

impl MempoolController for MempoolControllerImpl {
    /// rebuild the filter around the new head, pool contents are kept
    fn notify_new_head(&self, head: &BlockHeader) {
        self.filter_state
            .write()
            .on_flush(self.protocol.as_ref(), head);
    }

    /// prefilter operations and store the accepted ones
    fn add_operations(
        &self,
        operations: Vec<Operation>,
        now: Timestamp,
    ) -> Vec<(OperationId, PrefilterOutcome)> {
        let state = self.filter_snapshot();
        let durations = self.protocol.round_durations();

        let mut outcomes = Vec::with_capacity(operations.len());
        let mut accepted = Vec::new();
        for op in operations {
            let mut outcome = filter::pre_filter(&self.config, durations, &state, &op, now);
            if outcome.is_accepted() && classify(self.protocol.as_ref(), &op) == PoolBucket::Bad {
                outcome = PrefilterOutcome::Refused(RefusalReason::NoValidationPass);
            }
            tenderbake_trace!("mempool.add_operations.outcome", {
                "op": op.id.to_string(),
                "outcome": format!("{:?}", outcome)
            });
            outcomes.push((op.id, outcome.clone()));
            if outcome.is_accepted() {
                accepted.push(op);
            }
        }

        if !accepted.is_empty() {
            let mut pool = self.operation_pool.write();
            pool.add_operations(self.protocol.as_ref(), accepted);
            debug!("mempool now holds {} operations", pool.len());
        }
        outcomes
    }

    fn post_filter(&self, operation: &Operation, results: &[ManagerOperationResult]) -> bool {
        filter::post_filter(&self.config, operation, results)
    }

    fn remove_operations(&self, ids: &[OperationId]) {
        self.operation_pool.write().remove_operations(ids);
    }

    fn flush(&self) {
        self.operation_pool.write().flush();
        debug!("mempool flushed");
    }

    fn get_operation_count(&self) -> usize {
        self.operation_pool.read().len()
    }

    fn get_ordered_operations(&self) -> Vec<Vec<Operation>> {
        OrderedPool::of_pool(&self.operation_pool.read()).to_list_list()
    }

    fn get_relevant_operations(
        &self,
        endorsement_filter: ConsensusFilter,
        preendorsement_filter: Option<ConsensusFilter>,
    ) -> Vec<Vec<Operation>> {
        self.operation_pool
            .read()
            .filter_with_relevant_consensus_ops(&endorsement_filter, preendorsement_filter.as_ref())
            .to_list_list()
    }

    /// Returns a boxed clone of self.
    /// Allows cloning `Box<dyn MempoolController>`,
    fn clone_box(&self) -> Box<dyn MempoolController> {
        Box::new(self.clone())
    }
}
