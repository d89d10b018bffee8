// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::fitness::RawFitness;
use crate::hash::BlockHash;
use crate::level::Level;
use serde::{Deserialize, Serialize};
use tenderbake_time::Timestamp;

/// Protocol-independent part of a block header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// identity of the block
    pub hash: BlockHash,
    /// height of the block
    pub level: Level,
    /// identity of the predecessor
    pub predecessor: BlockHash,
    /// time at which the block was produced
    pub timestamp: Timestamp,
    /// raw fitness, decoded by the protocol
    pub fitness: RawFitness,
}
