//! Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Operations waiting for inclusion, partitioned by validation pass.

use std::collections::BTreeMap;

use tenderbake_logging::tenderbake_trace;
use tenderbake_models::{
    config::{ANONYMOUS_PASS, CONSENSUS_PASS, MANAGERS_PASS, VALIDATION_PASSES_COUNT, VOTES_PASS},
    hash::OperationId,
    operation::{ConsensusKind, Operation},
    protocol::ProtocolView,
};
use tenderbake_pool_exports::{ConsensusFilter, PoolError, PoolResult};

/// Bucket of an operation in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolBucket {
    /// pre-endorsements and endorsements
    Consensus,
    /// proposals and ballots
    Votes,
    /// nonce revelations, denunciations, activations
    Anonymous,
    /// manager operations
    Managers,
    /// not exactly one validation pass: never stored
    Bad,
}

/// Bins an operation by the single validation pass the protocol assigns it.
pub fn classify(protocol: &dyn ProtocolView, op: &Operation) -> PoolBucket {
    match protocol.acceptable_passes(op).as_slice() {
        [CONSENSUS_PASS] => PoolBucket::Consensus,
        [VOTES_PASS] => PoolBucket::Votes,
        [ANONYMOUS_PASS] => PoolBucket::Anonymous,
        [MANAGERS_PASS] => PoolBucket::Managers,
        _ => PoolBucket::Bad,
    }
}

/// Four disjoint sets of operations, keyed by identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationPool {
    consensus: BTreeMap<OperationId, Operation>,
    votes: BTreeMap<OperationId, Operation>,
    anonymous: BTreeMap<OperationId, Operation>,
    managers: BTreeMap<OperationId, Operation>,
}

impl OperationPool {
    fn bucket_mut(&mut self, bucket: PoolBucket) -> Option<&mut BTreeMap<OperationId, Operation>> {
        match bucket {
            PoolBucket::Consensus => Some(&mut self.consensus),
            PoolBucket::Votes => Some(&mut self.votes),
            PoolBucket::Anonymous => Some(&mut self.anonymous),
            PoolBucket::Managers => Some(&mut self.managers),
            PoolBucket::Bad => None,
        }
    }

    fn buckets(&self) -> [&BTreeMap<OperationId, Operation>; VALIDATION_PASSES_COUNT] {
        [&self.consensus, &self.votes, &self.anonymous, &self.managers]
    }

    /// Adds an operation to its bucket. Duplicates and operations without a single
    /// validation pass are ignored. Returns whether the pool changed.
    pub fn add_operation(&mut self, protocol: &dyn ProtocolView, op: Operation) -> bool {
        let bucket = classify(protocol, &op);
        let Some(set) = self.bucket_mut(bucket) else {
            tenderbake_trace!("mempool.pool.add_operation.bad", { "op": op.id.to_string() });
            return false;
        };
        if set.contains_key(&op.id) {
            return false;
        }
        set.insert(op.id, op);
        true
    }

    /// Adds a list of operations to the pool
    pub fn add_operations(
        &mut self,
        protocol: &dyn ProtocolView,
        ops: impl IntoIterator<Item = Operation>,
    ) {
        for op in ops {
            self.add_operation(protocol, op);
        }
    }

    /// Removes operations, e.g. once included in an applied block.
    pub fn remove_operations<'a>(&mut self, ids: impl IntoIterator<Item = &'a OperationId>) {
        for id in ids {
            self.consensus.remove(id);
            self.votes.remove(id);
            self.anonymous.remove(id);
            self.managers.remove(id);
        }
    }

    /// Checks whether an operation is stored in the pool.
    pub fn contains(&self, id: &OperationId) -> bool {
        self.buckets().iter().any(|set| set.contains_key(id))
    }

    /// Get the number of stored operations
    pub fn len(&self) -> usize {
        self.buckets().iter().map(|set| set.len()).sum()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the pool
    pub fn flush(&mut self) {
        *self = OperationPool::default();
    }

    /// Adds every operation of `other`, bucket by bucket.
    pub fn union(&mut self, other: OperationPool) {
        self.consensus.extend(other.consensus);
        self.votes.extend(other.votes);
        self.anonymous.extend(other.anonymous);
        self.managers.extend(other.managers);
    }

    /// Keeps the pre-endorsements matching `preendorsement_filter` and the endorsements
    /// matching `endorsement_filter`; non-consensus operations are kept unchanged.
    pub fn filter_with_relevant_consensus_ops(
        &self,
        endorsement_filter: &ConsensusFilter,
        preendorsement_filter: Option<&ConsensusFilter>,
    ) -> OperationPool {
        let matches = |filter: &ConsensusFilter, op: &Operation| {
            op.consensus_content().is_some_and(|(_, content)| {
                content.level == filter.level
                    && content.round == filter.round
                    && content.block_payload_hash == filter.payload_hash
            })
        };
        let consensus = self
            .consensus
            .iter()
            .filter(|&(_, op)| match op.consensus_content() {
                Some((ConsensusKind::Preendorsement, _)) => {
                    preendorsement_filter.is_some_and(|filter| matches(filter, op))
                }
                Some((ConsensusKind::Endorsement, _)) => matches(endorsement_filter, op),
                None => true,
            })
            .map(|(id, op)| (*id, op.clone()))
            .collect();
        OperationPool {
            consensus,
            ..self.clone()
        }
    }

    /// One list per validation pass, each sorted by operation identity.
    pub fn to_list_list(&self) -> Vec<Vec<Operation>> {
        self.buckets()
            .iter()
            .map(|set| set.values().cloned().collect())
            .collect()
    }

    /// Rebuilds a pool from one list per validation pass, trusting the list index as
    /// the bucket of its operations.
    pub fn of_list_list(lists: Vec<Vec<Operation>>) -> PoolResult<OperationPool> {
        let ordered = OrderedPool::of_list_list(lists)?;
        Ok(ordered.into_pool())
    }
}

/// Deterministic projection of a pool, as assembled in a block payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedPool {
    /// pre-endorsements and endorsements
    pub consensus: Vec<Operation>,
    /// proposals and ballots
    pub votes: Vec<Operation>,
    /// anonymous operations
    pub anonymous: Vec<Operation>,
    /// manager operations
    pub managers: Vec<Operation>,
}

impl OrderedPool {
    /// Orders a pool by operation identity within each validation pass.
    pub fn of_pool(pool: &OperationPool) -> OrderedPool {
        let [consensus, votes, anonymous, managers] = pool.buckets();
        let ordered = |set: &BTreeMap<OperationId, Operation>| -> Vec<Operation> {
            set.values().cloned().collect()
        };
        OrderedPool {
            consensus: ordered(consensus),
            votes: ordered(votes),
            anonymous: ordered(anonymous),
            managers: ordered(managers),
        }
    }

    /// One list per validation pass
    pub fn to_list_list(self) -> Vec<Vec<Operation>> {
        vec![self.consensus, self.votes, self.anonymous, self.managers]
    }

    /// Reads exactly one list per validation pass.
    pub fn of_list_list(lists: Vec<Vec<Operation>>) -> PoolResult<OrderedPool> {
        let got = lists.len();
        let [consensus, votes, anonymous, managers]: [Vec<Operation>; VALIDATION_PASSES_COUNT] =
            lists.try_into().map_err(|_| PoolError::InvalidPassCount {
                expected: VALIDATION_PASSES_COUNT,
                got,
            })?;
        Ok(OrderedPool {
            consensus,
            votes,
            anonymous,
            managers,
        })
    }

    /// Back to sets; duplicates collapse.
    pub fn into_pool(self) -> OperationPool {
        let set = |ops: Vec<Operation>| -> BTreeMap<OperationId, Operation> {
            ops.into_iter().map(|op| (op.id, op)).collect()
        };
        OperationPool {
            consensus: set(self.consensus),
            votes: set(self.votes),
            anonymous: set(self.anonymous),
            managers: set(self.managers),
        }
    }
}
