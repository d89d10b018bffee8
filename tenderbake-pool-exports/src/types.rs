//! Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use tenderbake_models::hash::PayloadHash;
use tenderbake_models::level::Level;
use tenderbake_models::round::Round;

/// Priority of an operation that passed the prefilter. Variants are declared from the
/// lowest to the highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// manager operations
    Manager,
    /// pre-endorsements and endorsements
    Consensus,
}

/// Why an operation was rejected by the prefilter
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum RefusalReason {
    /// consensus operation at level {level} round {round} is too far in the future
    ConsensusOperationInTheFuture {
        /// level of the operation
        level: Level,
        /// round of the operation
        round: Round,
    },
    /// fees too low
    FeesTooLow,
    /// gas limit {gas_limit} exceeds the block limit {limit}
    GasLimitTooHigh {
        /// total gas limit of the batch
        gas_limit: u64,
        /// hard limit per block
        limit: u64,
    },
    /// failing noop operations are never valid
    FailingNoop,
    /// operation contents are malformed
    MalformedOperation,
    /// operation does not belong to exactly one validation pass
    NoValidationPass,
    /// arithmetic error while filtering: {0}
    ArithmeticError(String),
}

/// Outcome of the prefilter for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefilterOutcome {
    /// no decision, left to full validation
    Undecided,
    /// plausible operation, classified with a priority
    PassedPrefilter(Priority),
    /// rejected on the current branch, may become valid on another one
    BranchRefused(RefusalReason),
    /// rejected whatever the branch
    Refused(RefusalReason),
}

impl PrefilterOutcome {
    /// whether the operation is kept in the mempool
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            PrefilterOutcome::Undecided | PrefilterOutcome::PassedPrefilter(_)
        )
    }
}

/// Result of the application of one manager operation of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerOperationResult {
    /// applied successfully
    Applied,
    /// applied then reverted because a later operation of the batch failed
    Backtracked,
    /// failed, e.g. a script failure
    Failed,
    /// not applied because an earlier operation of the batch failed
    Skipped,
}

/// Exact position a kept consensus operation must match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsensusFilter {
    /// level of the candidate
    pub level: Level,
    /// round of the candidate
    pub round: Round,
    /// payload of the candidate
    pub payload_hash: PayloadHash,
}
