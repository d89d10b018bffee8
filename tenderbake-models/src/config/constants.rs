//! DEFAULT VALUES USED TO INITIALIZE DIVERS CONFIGURATIONS STRUCTURES
//!
//! These values are the protocol and mempool constants that make sense to never be
//! modified by a user. They are passed with dependency injection in a `cfg` parameter
//! to each component, which keeps unit tests independent from them.

/// Round durations (seconds) of the explicit schedule prefix on mainnet
pub const ROUND_DURATIONS: [u32; 2] = [30, 45];

/// Version byte opening a Tenderbake fitness
pub const TENDERBAKE_FITNESS_VERSION: u8 = 2;

/// Number of validation passes, i.e. of operation pool buckets
pub const VALIDATION_PASSES_COUNT: usize = 4;
/// Validation pass of pre-endorsements and endorsements
pub const CONSENSUS_PASS: usize = 0;
/// Validation pass of proposals and ballots
pub const VOTES_PASS: usize = 1;
/// Validation pass of anonymous operations (nonces, denunciations, activations)
pub const ANONYMOUS_PASS: usize = 2;
/// Validation pass of manager operations
pub const MANAGERS_PASS: usize = 3;

/// Default minimal flat fee of a manager operation, in mutez
pub const MINIMAL_FEES: u64 = 100;
/// Default minimal fee per gas unit, in nanotez
pub const MINIMAL_NANOTEZ_PER_GAS_UNIT: u64 = 100;
/// Default minimal fee per byte, in nanotez
pub const MINIMAL_NANOTEZ_PER_BYTE: u64 = 1000;
/// Maximal gas of the operations of a block
pub const HARD_GAS_LIMIT_PER_BLOCK: u64 = 5_200_000;
