//! Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Mempool admission filter.
//!
//! Consensus operations are judged against the head tracked by the filter: an
//! operation is kept unless even the earliest start time its (level, round) could
//! have is beyond the local clock plus the configured drift. Manager operations are
//! judged on their fees, everything else is left to full validation.

use num::{BigInt, BigRational};
use tenderbake_models::{
    amount::Mutez,
    block_header::BlockHeader,
    level::Level,
    operation::{ManagerOperation, Operation, OperationShape},
    protocol::ProtocolView,
    round::{Round, RoundDurations},
    ModelsResult,
};
use tenderbake_pool_exports::{
    FilterConfig, ManagerOperationResult, PrefilterOutcome, Priority, RefusalReason,
};
use tenderbake_time::{Period, Timestamp};
use tracing::debug;

/// Position of the block the filter judges consensus operations against, and the
/// timing facts derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalState {
    /// level of the tracked proposal
    pub proposal_level: Level,
    /// round of the tracked proposal
    pub proposal_round: Round,
    /// time at which the tracked proposal was produced
    pub proposal_timestamp: Timestamp,
    /// start of the level preceding the proposal's, assuming it began at round zero
    pub grandparent_level_start: Timestamp,
    /// duration of round zero
    pub round_zero_duration: Period,
}

/// Filter state of a mempool session. Copied out of its lock for each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// no head was adopted yet
    Uninitialized,
    /// the head carries no usable round: every consensus operation is kept
    PassThrough,
    /// timing facts of the head are known
    Ready(ProposalState),
}

impl FilterState {
    /// Builds the state around a new head, degrading to pass-through when the head's
    /// rounds or timing cannot be determined.
    pub fn init(protocol: &dyn ProtocolView, head: &BlockHeader) -> FilterState {
        match ProposalState::of_head(protocol, head) {
            Ok(state) => {
                debug!(
                    "mempool filter ready on head {} (level {}, round {})",
                    head.hash, state.proposal_level, state.proposal_round
                );
                FilterState::Ready(state)
            }
            Err(err) => {
                debug!(
                    "mempool filter in pass-through mode on head {}: {}",
                    head.hash, err
                );
                FilterState::PassThrough
            }
        }
    }

    /// Rebuilds the state on a head change.
    pub fn on_flush(&mut self, protocol: &dyn ProtocolView, new_head: &BlockHeader) {
        *self = FilterState::init(protocol, new_head);
    }
}

impl ProposalState {
    fn of_head(protocol: &dyn ProtocolView, head: &BlockHeader) -> ModelsResult<ProposalState> {
        let durations = protocol.round_durations();
        let proposal_level = protocol.current_level(head)?;
        let proposal_round = protocol.round(head)?;
        let grandparent_round = protocol.predecessor_round(head)?;
        let proposal_timestamp = protocol.predecessor_timestamp(head);

        // the proposal's level started once the grandparent's rounds up to its own
        // had elapsed, and the proposal was produced `offset(proposal_round)` later
        let proposal_level_offset = durations.level_offset_of_round(grandparent_round.succ()?)?;
        let proposal_round_offset = durations.level_offset_of_round(proposal_round)?;
        let proposal_offset = proposal_level_offset.checked_add(proposal_round_offset)?;
        let grandparent_level_start = proposal_timestamp.checked_sub(proposal_offset)?;

        Ok(ProposalState {
            proposal_level,
            proposal_round,
            proposal_timestamp,
            grandparent_level_start,
            round_zero_duration: durations.duration_of_round(Round::zero())?,
        })
    }
}

/// Whether a consensus operation at (`op_level`, `op_round`) is not implausibly early.
///
/// Operations more than one level below the proposal, or at the proposal's level and
/// a round no later than its own, are always kept. Otherwise the earliest start of the
/// operation's round is computed assuming every level since the proposal's predecessor
/// ended at round zero, and compared to the local clock plus the drift tolerance.
pub fn acceptable_op(
    config: &FilterConfig,
    durations: &RoundDurations,
    state: &ProposalState,
    op_level: Level,
    op_round: Round,
    now_timestamp: Timestamp,
) -> ModelsResult<bool> {
    if op_level.succ()? < state.proposal_level
        || (op_level == state.proposal_level && op_round <= state.proposal_round)
    {
        return Ok(true);
    }

    // a local clock running late must not reject operations the proposal already
    // proves possible
    let now_timestamp = std::cmp::max(now_timestamp, state.proposal_timestamp);
    let drift = config.clock_drift.unwrap_or(state.round_zero_duration);

    // op_level >= proposal_level - 1 here
    let level_offset = op_level.diff(state.proposal_level) + 1;
    let time_shift = state.round_zero_duration.checked_mul(level_offset)?;
    let earliest_op_level_start = state.grandparent_level_start.checked_add(time_shift)?;
    let earliest_op_timestamp = durations.timestamp_of_another_round_same_level(
        earliest_op_level_start,
        Round::zero(),
        op_round,
    )?;
    Ok(earliest_op_timestamp <= now_timestamp.checked_add(drift)?)
}

/// Fast, context-free decision on an incoming operation.
pub fn pre_filter(
    config: &FilterConfig,
    durations: &RoundDurations,
    state: &FilterState,
    op: &Operation,
    now_timestamp: Timestamp,
) -> PrefilterOutcome {
    match op.shape() {
        OperationShape::Consensus(_, content) => match state {
            FilterState::Uninitialized | FilterState::PassThrough => {
                PrefilterOutcome::PassedPrefilter(Priority::Consensus)
            }
            FilterState::Ready(proposal) => match acceptable_op(
                config,
                durations,
                proposal,
                content.level,
                content.round,
                now_timestamp,
            ) {
                Ok(true) => PrefilterOutcome::PassedPrefilter(Priority::Consensus),
                Ok(false) => {
                    PrefilterOutcome::BranchRefused(RefusalReason::ConsensusOperationInTheFuture {
                        level: content.level,
                        round: content.round,
                    })
                }
                Err(err) => PrefilterOutcome::BranchRefused(RefusalReason::ArithmeticError(
                    err.to_string(),
                )),
            },
        },
        OperationShape::Governance | OperationShape::Anonymous => PrefilterOutcome::Undecided,
        OperationShape::Managers(managers) => pre_filter_manager(config, op, &managers),
        OperationShape::FailingNoop => PrefilterOutcome::Refused(RefusalReason::FailingNoop),
        OperationShape::Malformed => PrefilterOutcome::Refused(RefusalReason::MalformedOperation),
    }
}

/// Fee check of a manager operation batch: the fees must cover the flat minimum plus
/// the per-gas-unit and per-byte minimums, all compared exactly in nanotez.
pub fn pre_filter_manager(
    config: &FilterConfig,
    op: &Operation,
    managers: &[&ManagerOperation],
) -> PrefilterOutcome {
    let mut total_fee = Mutez::from_mutez(0);
    let mut total_gas: u64 = 0;
    for manager in managers {
        match (
            total_fee.checked_add(manager.fee),
            total_gas.checked_add(manager.gas_limit),
        ) {
            (Some(fee), Some(gas)) => {
                total_fee = fee;
                total_gas = gas;
            }
            _ => {
                return PrefilterOutcome::Refused(RefusalReason::ArithmeticError(
                    "batch fees or gas overflow".to_string(),
                ))
            }
        }
    }

    if total_gas > config.hard_gas_limit_per_block {
        return PrefilterOutcome::Refused(RefusalReason::GasLimitTooHigh {
            gas_limit: total_gas,
            limit: config.hard_gas_limit_per_block,
        });
    }

    let nanotez = BigInt::from(1000u32);
    let to_big = |ratio: &num::rational::Ratio<u64>| {
        BigRational::new(BigInt::from(*ratio.numer()), BigInt::from(*ratio.denom()))
    };
    let fees = BigRational::from_integer(BigInt::from(total_fee.to_mutez()) * &nanotez);
    let minimal_fees =
        BigRational::from_integer(BigInt::from(config.minimal_fees.to_mutez()) * &nanotez);
    let minimal_fees_for_gas =
        to_big(&config.minimal_nanotez_per_gas_unit) * BigInt::from(total_gas);
    let minimal_fees_for_size =
        to_big(&config.minimal_nanotez_per_byte) * BigInt::from(op.size);

    if fees >= minimal_fees + minimal_fees_for_gas + minimal_fees_for_size {
        PrefilterOutcome::PassedPrefilter(Priority::Manager)
    } else {
        PrefilterOutcome::Refused(RefusalReason::FeesTooLow)
    }
}

/// Decision once an operation was applied. Only manager operations can be refused:
/// a batch whose application did not fully succeed is kept iff script failures are
/// allowed.
pub fn post_filter(
    config: &FilterConfig,
    op: &Operation,
    results: &[ManagerOperationResult],
) -> bool {
    match op.shape() {
        OperationShape::Managers(_) => {
            results
                .iter()
                .all(|result| *result == ManagerOperationResult::Applied)
                || config.allow_script_failure
        }
        OperationShape::Consensus(..)
        | OperationShape::Governance
        | OperationShape::Anonymous
        | OperationShape::FailingNoop
        | OperationShape::Malformed => true,
    }
}
