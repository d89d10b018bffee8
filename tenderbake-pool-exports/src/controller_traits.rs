// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::types::{ConsensusFilter, ManagerOperationResult, PrefilterOutcome};
use tenderbake_models::block_header::BlockHeader;
use tenderbake_models::hash::OperationId;
use tenderbake_models::operation::Operation;
use tenderbake_time::Timestamp;

/// Trait defining a mempool controller
pub trait MempoolController: Send + Sync {
    /// Notify of a new head: the filter is rebuilt around it.
    fn notify_new_head(&self, head: &BlockHeader);

    /// Classify, prefilter and store operations received at `now`.
    /// Returns the prefilter outcome of each operation.
    fn add_operations(
        &self,
        operations: Vec<Operation>,
        now: Timestamp,
    ) -> Vec<(OperationId, PrefilterOutcome)>;

    /// Decide whether an applied operation is kept, given its application results.
    fn post_filter(&self, operation: &Operation, results: &[ManagerOperationResult]) -> bool;

    /// Remove operations, e.g. once included in an applied block.
    fn remove_operations(&self, ids: &[OperationId]);

    /// Empty the pool. The filter state is kept.
    fn flush(&self);

    /// Get the number of operations in the pool
    fn get_operation_count(&self) -> usize;

    /// Pool contents, one deterministic list per validation pass
    fn get_ordered_operations(&self) -> Vec<Vec<Operation>>;

    /// Pool contents narrowed to the consensus operations of one candidate, one list
    /// per validation pass
    fn get_relevant_operations(
        &self,
        endorsement_filter: ConsensusFilter,
        preendorsement_filter: Option<ConsensusFilter>,
    ) -> Vec<Vec<Operation>>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn MempoolController>`.
    fn clone_box(&self) -> Box<dyn MempoolController>;
}

/// Allow cloning `Box<dyn MempoolController>`
/// Uses `MempoolController::clone_box` internally
impl Clone for Box<dyn MempoolController> {
    fn clone(&self) -> Box<dyn MempoolController> {
        self.clone_box()
    }
}
