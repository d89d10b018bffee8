// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Tenderbake fitness, the chain-selection score carried by block headers.
//!
//! Raw layout, one byte string per component:
//! `[version] [level: u32 BE] [locked_round: empty | i32 BE] [predecessor_round: i32 BE] [round: i32 BE]`
//! where the predecessor round is stored as `-round - 1` so that a lower predecessor
//! round compares as a higher fitness.

use crate::config::TENDERBAKE_FITNESS_VERSION;
use crate::error::{ModelsError, ModelsResult};
use crate::level::Level;
use crate::round::Round;
use nom::combinator::all_consuming;
use nom::error::{context, ContextError, ParseError, VerboseError};
use nom::number::complete::{be_i32, be_u32};
use nom::IResult;

/// Raw fitness, as found in a block header
pub type RawFitness = Vec<Vec<u8>>;

/// Decoded Tenderbake fitness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fitness {
    /// level of the block
    pub level: Level,
    /// round of the locked proposal, if any
    pub locked_round: Option<Round>,
    /// round of the predecessor block
    pub predecessor_round: Round,
    /// round of the block
    pub round: Round,
}

fn level_component<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
    input: &'a [u8],
) -> IResult<&'a [u8], u32, E> {
    context("Failed level deserialization", all_consuming(be_u32))(input)
}

fn round_component<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
    input: &'a [u8],
) -> IResult<&'a [u8], i32, E> {
    context("Failed round deserialization", all_consuming(be_i32))(input)
}

fn decode<'a, T>(
    parser: impl Fn(&'a [u8]) -> IResult<&'a [u8], T, VerboseError<&'a [u8]>>,
    bytes: &'a [u8],
) -> ModelsResult<T> {
    parser(bytes)
        .map(|(_, value)| value)
        .map_err(|err| ModelsError::InvalidFitness(format!("{:?}", err)))
}

impl Fitness {
    /// Decodes a raw fitness; fails on anything that is not a Tenderbake fitness
    /// (genesis, older protocols).
    pub fn from_raw(raw: &[Vec<u8>]) -> ModelsResult<Fitness> {
        let [version, level, locked_round, predecessor_round, round] = raw else {
            return Err(ModelsError::InvalidFitness(format!(
                "expected 5 components, got {}",
                raw.len()
            )));
        };
        if version.as_slice() != [TENDERBAKE_FITNESS_VERSION].as_slice() {
            return Err(ModelsError::InvalidFitness(format!(
                "unknown version {:?}",
                version
            )));
        }
        let level = Level::new(decode(level_component, level)?);
        let locked_round = if locked_round.is_empty() {
            None
        } else {
            Some(Round::of_i32(decode(round_component, locked_round)?)?)
        };
        // `!r == -r - 1`, defined on the whole i32 range
        let predecessor_round = Round::of_i32(!decode(round_component, predecessor_round)?)?;
        let round = Round::of_i32(decode(round_component, round)?)?;
        Ok(Fitness {
            level,
            locked_round,
            predecessor_round,
            round,
        })
    }

    /// Encodes the fitness.
    pub fn to_raw(&self) -> RawFitness {
        vec![
            vec![TENDERBAKE_FITNESS_VERSION],
            self.level.to_u32().to_be_bytes().to_vec(),
            self.locked_round
                .map(|r| r.to_i32().to_be_bytes().to_vec())
                .unwrap_or_default(),
            (!self.predecessor_round.to_i32()).to_be_bytes().to_vec(),
            self.round.to_i32().to_be_bytes().to_vec(),
        ]
    }
}
