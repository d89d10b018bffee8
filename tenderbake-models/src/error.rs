// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use tenderbake_time::{TimeError, Timestamp};
use thiserror::Error;

/// models result
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// models error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelsError {
    /// round error: {0}
    RoundError(#[from] RoundError),
    /// time error: {0}
    TimeError(#[from] TimeError),
    /// level overflow error
    LevelOverflowError,
    /// invalid fitness: {0}
    InvalidFitness(String),
    /// hash parsing error: {0}
    HashParseError(String),
    /// serialization error: {0}
    SerializeError(String),
}

/// Errors of the round clock. Construction errors make it impossible to build an
/// invalid `Round` or `RoundDurations`; the others are typed arithmetic failures.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// negative round: {0}
    NegativeRound(i64),
    /// round overflow: {0} does not fit in a 32-bit round
    RoundOverflow(i64),
    /// the predecessor of round zero is undefined
    PredOfZero,
    /// timestamp {timestamp} is before the start of the level at {level_start}
    TimestampBeforeLevelStart {
        /// considered timestamp
        timestamp: Timestamp,
        /// start of round zero at the current level
        level_start: Timestamp,
    },
    /// round durations must be non-decreasing, got {previous} then {next}
    NonIncreasingRounds {
        /// duration of a round
        previous: i64,
        /// duration of the next round, smaller than `previous`
        next: i64,
    },
    /// at least two round durations are required, got {0}
    NotEnoughRoundDurations(usize),
    /// round durations must be positive, got {0}
    NonPositiveRoundDuration(i64),
    /// arithmetic error: {0}
    ArithmeticError(#[from] TimeError),
}
