// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::amount::Mutez;
use crate::error::{ModelsError, ModelsResult};
use crate::hash::{BlockHash, Hash, OperationId, PayloadHash};
use crate::level::Level;
use crate::round::Round;
use serde::{Deserialize, Serialize};

/// Position a (pre-)endorsement votes for
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsensusContent {
    /// first slot of the endorser in the committee
    pub slot: u16,
    /// level of the endorsed block
    pub level: Level,
    /// round of the endorsed block
    pub round: Round,
    /// payload of the endorsed block
    pub block_payload_hash: PayloadHash,
}

/// Pre-vote or vote
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusKind {
    /// pre-vote
    Preendorsement,
    /// vote
    Endorsement,
}

/// Governance ballot
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotKind {
    /// for
    Yay,
    /// against
    Nay,
    /// abstention
    Pass,
}

/// Payload of a manager operation
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerKind {
    /// reveal the public key of the source
    Reveal {
        /// revealed key
        public_key: String,
    },
    /// transfer tez, possibly calling a contract
    Transaction {
        /// transferred amount
        amount: Mutez,
        /// receiver
        destination: String,
    },
    /// create a contract
    Origination {
        /// initial balance
        balance: Mutez,
    },
    /// set or withdraw the delegate of the source
    Delegation {
        /// new delegate
        delegate: Option<String>,
    },
    /// register a global Michelson constant
    RegisterGlobalConstant {
        /// expression
        value: String,
    },
    /// set or unset the frozen deposits limit of a delegate
    SetDepositsLimit {
        /// limit
        limit: Option<Mutez>,
    },
}

/// Operation submitted and paid for by an account
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerOperation {
    /// paying account
    pub source: String,
    /// fee
    pub fee: Mutez,
    /// replay protection counter
    pub counter: u64,
    /// maximal gas spent
    pub gas_limit: u64,
    /// maximal storage burnt, in bytes
    pub storage_limit: u64,
    /// payload
    pub kind: ManagerKind,
}

/// One item of the contents of an operation
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contents {
    /// pre-vote for a candidate block
    Preendorsement(ConsensusContent),
    /// vote for a candidate block
    Endorsement(ConsensusContent),
    /// revelation of a committed nonce
    SeedNonceRevelation {
        /// level of the commitment
        level: Level,
        /// revealed nonce
        nonce: Hash,
    },
    /// denunciation of two conflicting pre-endorsements
    DoublePreendorsementEvidence {
        /// first pre-endorsement
        op1: ConsensusContent,
        /// second pre-endorsement
        op2: ConsensusContent,
    },
    /// denunciation of two conflicting endorsements
    DoubleEndorsementEvidence {
        /// first endorsement
        op1: ConsensusContent,
        /// second endorsement
        op2: ConsensusContent,
    },
    /// denunciation of two blocks baked at the same level and round
    DoubleBakingEvidence {
        /// first block
        bh1: BlockHash,
        /// second block
        bh2: BlockHash,
    },
    /// activation of a fundraiser account
    ActivateAccount {
        /// activated account
        pkh: String,
        /// activation secret
        secret: Vec<u8>,
    },
    /// protocol amendment proposals
    Proposals {
        /// delegate
        source: String,
        /// voting period
        period: i32,
        /// proposed protocols
        proposals: Vec<Hash>,
    },
    /// protocol amendment ballot
    Ballot {
        /// delegate
        source: String,
        /// voting period
        period: i32,
        /// voted protocol
        proposal: Hash,
        /// vote
        ballot: BallotKind,
    },
    /// operation that is never valid
    FailingNoop(Vec<u8>),
    /// manager operation, possibly part of a batch
    Manager(ManagerOperation),
}

/// Operation as received from the network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// structural identity
    pub id: OperationId,
    /// block the operation was forged on
    pub branch: BlockHash,
    /// contents, a single item or a batch of manager operations
    pub contents: Vec<Contents>,
    /// size of the binary encoding, in bytes
    pub size: usize,
}

/// Classification of the contents of an operation, to be matched exhaustively
#[derive(Debug, PartialEq, Eq)]
pub enum OperationShape<'a> {
    /// single pre-endorsement or endorsement
    Consensus(ConsensusKind, &'a ConsensusContent),
    /// single proposals or ballot
    Governance,
    /// single nonce revelation, denunciation or activation
    Anonymous,
    /// non-empty batch of manager operations
    Managers(Vec<&'a ManagerOperation>),
    /// never valid
    FailingNoop,
    /// empty, or a batch containing something else than manager operations
    Malformed,
}

impl Operation {
    /// Builds an operation, its identity being the digest of its branch and contents.
    pub fn new(branch: BlockHash, contents: Vec<Contents>, size: usize) -> ModelsResult<Self> {
        let bytes = serde_json::to_vec(&(&branch, &contents))
            .map_err(|err| ModelsError::SerializeError(err.to_string()))?;
        Ok(Operation {
            id: OperationId(Hash::compute_from(&bytes)),
            branch,
            contents,
            size,
        })
    }

    /// Shape of the contents.
    pub fn shape(&self) -> OperationShape<'_> {
        match self.contents.as_slice() {
            [] => OperationShape::Malformed,
            [single] => match single {
                Contents::Preendorsement(content) => {
                    OperationShape::Consensus(ConsensusKind::Preendorsement, content)
                }
                Contents::Endorsement(content) => {
                    OperationShape::Consensus(ConsensusKind::Endorsement, content)
                }
                Contents::Proposals { .. } | Contents::Ballot { .. } => OperationShape::Governance,
                Contents::SeedNonceRevelation { .. }
                | Contents::DoublePreendorsementEvidence { .. }
                | Contents::DoubleEndorsementEvidence { .. }
                | Contents::DoubleBakingEvidence { .. }
                | Contents::ActivateAccount { .. } => OperationShape::Anonymous,
                Contents::FailingNoop(_) => OperationShape::FailingNoop,
                Contents::Manager(op) => OperationShape::Managers(vec![op]),
            },
            batch => {
                let managers: Option<Vec<&ManagerOperation>> = batch
                    .iter()
                    .map(|contents| match contents {
                        Contents::Manager(op) => Some(op),
                        _ => None,
                    })
                    .collect();
                match managers {
                    Some(managers) => OperationShape::Managers(managers),
                    None => OperationShape::Malformed,
                }
            }
        }
    }

    /// Consensus content, if the operation is a single (pre-)endorsement.
    pub fn consensus_content(&self) -> Option<(ConsensusKind, &ConsensusContent)> {
        match self.shape() {
            OperationShape::Consensus(kind, content) => Some((kind, content)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(counter: u64) -> Contents {
        Contents::Manager(ManagerOperation {
            source: "tz1source".to_string(),
            fee: Mutez::from_mutez(1000),
            counter,
            gas_limit: 1500,
            storage_limit: 0,
            kind: ManagerKind::Transaction {
                amount: Mutez::from_mutez(1),
                destination: "tz1dest".to_string(),
            },
        })
    }

    fn branch() -> BlockHash {
        BlockHash(Hash::compute_from(b"branch"))
    }

    #[test]
    fn test_identity_is_structural() {
        let op1 = Operation::new(branch(), vec![manager(1)], 100).unwrap();
        let op2 = Operation::new(branch(), vec![manager(1)], 100).unwrap();
        let op3 = Operation::new(branch(), vec![manager(2)], 100).unwrap();
        assert_eq!(op1.id, op2.id);
        assert_ne!(op1.id, op3.id);
    }

    #[test]
    fn test_shapes() {
        let batch = Operation::new(branch(), vec![manager(1), manager(2)], 200).unwrap();
        assert!(matches!(batch.shape(), OperationShape::Managers(ops) if ops.len() == 2));

        let empty = Operation::new(branch(), vec![], 0).unwrap();
        assert_eq!(empty.shape(), OperationShape::Malformed);

        let mixed = Operation::new(
            branch(),
            vec![manager(1), Contents::FailingNoop(vec![1, 2])],
            50,
        )
        .unwrap();
        assert_eq!(mixed.shape(), OperationShape::Malformed);

        let noop = Operation::new(branch(), vec![Contents::FailingNoop(vec![])], 10).unwrap();
        assert_eq!(noop.shape(), OperationShape::FailingNoop);

        let content = ConsensusContent {
            slot: 3,
            level: Level::new(10),
            round: Round::zero(),
            block_payload_hash: PayloadHash(Hash::compute_from(b"payload")),
        };
        let endorsement =
            Operation::new(branch(), vec![Contents::Endorsement(content)], 60).unwrap();
        assert_eq!(
            endorsement.consensus_content(),
            Some((ConsensusKind::Endorsement, &content))
        );
    }
}
