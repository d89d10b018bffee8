// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Narrow view on the economic protocol needed by the mempool filter and the
//! operation pool. Implemented once per protocol version.

use crate::block_header::BlockHeader;
use crate::config::{ANONYMOUS_PASS, CONSENSUS_PASS, MANAGERS_PASS, VOTES_PASS};
use crate::error::ModelsResult;
use crate::fitness::Fitness;
use crate::level::Level;
use crate::operation::{Operation, OperationShape};
use crate::round::{Round, RoundDurations};
use tenderbake_time::Timestamp;

/// Protocol capabilities consumed by the mempool
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait ProtocolView: Send + Sync {
    /// round duration schedule of the protocol constants
    fn round_durations(&self) -> &RoundDurations;

    /// validation passes an operation may be included in
    fn acceptable_passes(&self, op: &Operation) -> Vec<usize>;

    /// level of a block
    fn current_level(&self, header: &BlockHeader) -> ModelsResult<Level>;

    /// round of a block, fails when the header carries no round (e.g. genesis)
    fn round(&self, header: &BlockHeader) -> ModelsResult<Round>;

    /// round of the predecessor of a block
    fn predecessor_round(&self, header: &BlockHeader) -> ModelsResult<Round>;

    /// time at which a block, predecessor of the next one, was produced
    fn predecessor_timestamp(&self, header: &BlockHeader) -> Timestamp;
}

/// Tenderbake protocol view
#[derive(Debug, Clone)]
pub struct TenderbakeProtocol {
    round_durations: RoundDurations,
}

impl TenderbakeProtocol {
    /// new view from the protocol constants
    pub fn new(round_durations: RoundDurations) -> Self {
        TenderbakeProtocol { round_durations }
    }
}

impl ProtocolView for TenderbakeProtocol {
    fn round_durations(&self) -> &RoundDurations {
        &self.round_durations
    }

    fn acceptable_passes(&self, op: &Operation) -> Vec<usize> {
        match op.shape() {
            OperationShape::Consensus(..) => vec![CONSENSUS_PASS],
            OperationShape::Governance => vec![VOTES_PASS],
            OperationShape::Anonymous => vec![ANONYMOUS_PASS],
            OperationShape::Managers(_) => vec![MANAGERS_PASS],
            OperationShape::FailingNoop | OperationShape::Malformed => vec![],
        }
    }

    fn current_level(&self, header: &BlockHeader) -> ModelsResult<Level> {
        Ok(Fitness::from_raw(&header.fitness)?.level)
    }

    fn round(&self, header: &BlockHeader) -> ModelsResult<Round> {
        Ok(Fitness::from_raw(&header.fitness)?.round)
    }

    fn predecessor_round(&self, header: &BlockHeader) -> ModelsResult<Round> {
        Ok(Fitness::from_raw(&header.fitness)?.predecessor_round)
    }

    fn predecessor_timestamp(&self, header: &BlockHeader) -> Timestamp {
        header.timestamp
    }
}
