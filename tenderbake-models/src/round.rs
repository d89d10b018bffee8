// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Round clock: mapping between rounds of a level and wall-clock time.
//!
//! A level starts at round zero. Round `r` lasts `duration_of_round(r)`; the rounds
//! beyond the explicit prefix of the schedule grow linearly. Every function is pure
//! and reports overflows instead of wrapping.

use crate::error::RoundError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tenderbake_time::{Period, Timestamp};

/// Attempt index within a level. Non-negative by construction.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Round(i32);

impl Round {
    /// The highest representable round
    pub const MAX: Round = Round(i32::MAX);

    /// The first round of a level
    pub const fn zero() -> Round {
        Round(0)
    }

    /// Next round, fails on overflow.
    /// ```
    /// # use tenderbake_models::round::Round;
    /// assert_eq!(Round::zero().succ().unwrap(), Round::of_i32(1).unwrap());
    /// assert!(Round::MAX.succ().is_err());
    /// ```
    pub fn succ(self) -> Result<Round, RoundError> {
        self.0
            .checked_add(1)
            .map(Round)
            .ok_or(RoundError::RoundOverflow(self.0 as i64 + 1))
    }

    /// Previous round, round zero has none.
    /// ```
    /// # use tenderbake_models::{error::RoundError, round::Round};
    /// assert_eq!(Round::zero().pred(), Err(RoundError::PredOfZero));
    /// ```
    pub fn pred(self) -> Result<Round, RoundError> {
        if self.0 == 0 {
            return Err(RoundError::PredOfZero);
        }
        Ok(Round(self.0 - 1))
    }

    /// Checked conversion from a signed 32-bit integer.
    pub fn of_i32(value: i32) -> Result<Round, RoundError> {
        if value < 0 {
            return Err(RoundError::NegativeRound(value as i64));
        }
        Ok(Round(value))
    }

    /// Conversion to a signed 32-bit integer, always non-negative.
    pub const fn to_i32(self) -> i32 {
        self.0
    }

    /// Checked conversion from a native integer.
    /// ```
    /// # use tenderbake_models::round::Round;
    /// assert!(Round::of_int(-1).is_err());
    /// assert!(Round::of_int(i64::from(i32::MAX) + 1).is_err());
    /// assert_eq!(Round::of_int(12).unwrap().to_int(), 12);
    /// ```
    pub fn of_int(value: i64) -> Result<Round, RoundError> {
        if value < 0 {
            return Err(RoundError::NegativeRound(value));
        }
        let value: i32 = value
            .try_into()
            .map_err(|_| RoundError::RoundOverflow(value))?;
        Ok(Round(value))
    }

    /// Conversion to a native integer.
    pub const fn to_int(self) -> i64 {
        self.0 as i64
    }

    fn index(self) -> usize {
        // non-negative by construction
        self.0 as usize
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Round {
    type Error = RoundError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Round::of_i32(value)
    }
}

impl From<Round> for i32 {
    fn from(value: Round) -> Self {
        value.0
    }
}

/// Round start offset, relative to the start of the level, and time elapsed since
/// the start of that round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundAndOffset {
    /// round containing the considered offset
    pub round: Round,
    /// time elapsed since the start of `round`
    pub offset: Period,
}

/// Non-empty, non-decreasing schedule of round durations.
///
/// Holds the explicit durations of rounds `0..=k` (at least two of them). Round
/// `n > k` lasts `d_k + (n - k) * (d_k - d_{k-1})`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Period>", into = "Vec<Period>")]
pub struct RoundDurations {
    explicit: Vec<Period>,
    /// sum of the explicit durations, start of the extrapolated tail
    explicit_total: Period,
}

impl RoundDurations {
    /// Builds a schedule, checking the invariants.
    /// ```
    /// # use tenderbake_models::round::RoundDurations;
    /// # use tenderbake_time::Period;
    /// assert!(RoundDurations::new(vec![Period::from_secs(4), Period::from_secs(14)]).is_ok());
    /// assert!(RoundDurations::new(vec![Period::from_secs(10), Period::from_secs(5)]).is_err());
    /// ```
    pub fn new(durations: Vec<Period>) -> Result<Self, RoundError> {
        if durations.len() < 2 {
            return Err(RoundError::NotEnoughRoundDurations(durations.len()));
        }
        let mut previous: Option<Period> = None;
        let mut explicit_total = Period::ZERO;
        for &duration in &durations {
            if duration.is_zero() {
                return Err(RoundError::NonPositiveRoundDuration(duration.as_secs()));
            }
            if let Some(previous) = previous {
                if duration < previous {
                    return Err(RoundError::NonIncreasingRounds {
                        previous: previous.as_secs(),
                        next: duration.as_secs(),
                    });
                }
            }
            explicit_total = explicit_total.checked_add(duration)?;
            previous = Some(duration);
        }
        Ok(RoundDurations {
            explicit: durations,
            explicit_total,
        })
    }

    /// Builds a schedule from a list of seconds.
    pub fn from_secs(durations: &[u32]) -> Result<Self, RoundError> {
        Self::new(durations.iter().copied().map(Period::from_secs).collect())
    }

    /// Duration of round zero.
    pub fn first_round_duration(&self) -> Period {
        self.explicit[0]
    }

    fn last(&self) -> Period {
        self.explicit[self.explicit.len() - 1]
    }

    /// Growth of the duration per extrapolated round, non-negative by construction.
    fn increment(&self) -> Period {
        let len = self.explicit.len();
        Period::of_seconds(self.explicit[len - 1].as_secs() - self.explicit[len - 2].as_secs())
            .unwrap_or(Period::ZERO)
    }

    /// Duration of `round`.
    /// ```
    /// # use tenderbake_models::round::{Round, RoundDurations};
    /// # use tenderbake_time::Period;
    /// let durations = RoundDurations::from_secs(&[4, 14]).unwrap();
    /// let round = |r| Round::of_i32(r).unwrap();
    /// assert_eq!(durations.duration_of_round(round(1)).unwrap(), Period::from_secs(14));
    /// assert_eq!(durations.duration_of_round(round(3)).unwrap(), Period::from_secs(34));
    /// ```
    pub fn duration_of_round(&self, round: Round) -> Result<Period, RoundError> {
        let index = round.index();
        if let Some(duration) = self.explicit.get(index) {
            return Ok(*duration);
        }
        // rounds past the explicit prefix: index > k = len - 1
        let steps = (index - (self.explicit.len() - 1)) as i64;
        Ok(self
            .last()
            .checked_add(self.increment().checked_mul(steps)?)?)
    }

    /// Time between the start of the level and the start of `round`, i.e. the sum of
    /// the durations of rounds `0..round`.
    /// ```
    /// # use tenderbake_models::round::{Round, RoundDurations};
    /// # use tenderbake_time::Period;
    /// let durations = RoundDurations::from_secs(&[4, 14]).unwrap();
    /// let round = |r| Round::of_i32(r).unwrap();
    /// assert_eq!(durations.level_offset_of_round(round(0)).unwrap(), Period::ZERO);
    /// assert_eq!(durations.level_offset_of_round(round(2)).unwrap(), Period::from_secs(18));
    /// assert_eq!(durations.level_offset_of_round(round(4)).unwrap(), Period::from_secs(4 + 14 + 24 + 34));
    /// ```
    pub fn level_offset_of_round(&self, round: Round) -> Result<Period, RoundError> {
        let index = round.index();
        let len = self.explicit.len();
        if index <= len {
            let mut offset = Period::ZERO;
            for duration in &self.explicit[..index] {
                offset = offset.checked_add(*duration)?;
            }
            return Ok(offset);
        }
        let extra = (index - len) as i64;
        Ok(self.explicit_total.checked_add(self.tail_offset(extra)?)?)
    }

    /// Sum of the durations of the `m` first extrapolated rounds:
    /// `m * last + increment * m * (m + 1) / 2`.
    fn tail_offset(&self, m: i64) -> Result<Period, RoundError> {
        let triangle = m
            .checked_mul(m + 1)
            .map(|x| x / 2)
            .ok_or(RoundError::RoundOverflow(m))?;
        Ok(self
            .last()
            .checked_mul(m)?
            .checked_add(self.increment().checked_mul(triangle)?)?)
    }

    /// Finds the round containing `level_offset` and the time elapsed within it.
    ///
    /// Walks the explicit prefix, then solves the arithmetic progression of the tail in
    /// closed form.
    /// ```
    /// # use tenderbake_models::round::{Round, RoundAndOffset, RoundDurations};
    /// # use tenderbake_time::Period;
    /// let durations = RoundDurations::from_secs(&[4, 14]).unwrap();
    /// let res = durations.round_and_offset(Period::from_secs(20)).unwrap();
    /// assert_eq!(res, RoundAndOffset { round: Round::of_i32(2).unwrap(), offset: Period::from_secs(2) });
    /// ```
    pub fn round_and_offset(&self, level_offset: Period) -> Result<RoundAndOffset, RoundError> {
        let mut start = Period::ZERO;
        for (index, duration) in self.explicit.iter().enumerate() {
            let end = start.checked_add(*duration)?;
            if level_offset < end {
                return Ok(RoundAndOffset {
                    round: Round::of_int(index as i64)?,
                    offset: level_offset.checked_sub(start)?,
                });
            }
            start = end;
        }

        // level_offset lies in the extrapolated tail
        let tail = level_offset.checked_sub(self.explicit_total)?;
        let extra = self.tail_rounds_before(tail)?;
        let round = Round::of_int((self.explicit.len() as i64).saturating_add(extra))?;
        Ok(RoundAndOffset {
            round,
            offset: tail.checked_sub(self.tail_offset(extra)?)?,
        })
    }

    /// Largest `m >= 0` such that `tail_offset(m) <= tail`, capped just above the
    /// largest round count that fits in a `Round`.
    fn tail_rounds_before(&self, tail: Period) -> Result<i64, RoundError> {
        const MAX_M: i128 = i32::MAX as i128 + 1;
        let last = self.last().as_secs() as i128;
        let inc = self.increment().as_secs() as i128;
        let tail = tail.as_secs() as i128;
        // m <= MAX_M keeps every intermediate product below 2^127
        let sum = |m: i128| m * last + inc * m * (m + 1) / 2;

        let estimate = if inc == 0 {
            tail / last
        } else {
            // inc * m^2 + (2 * last + inc) * m - 2 * tail <= 0
            let b = (2 * last + inc) as u128;
            let discriminant = b
                .checked_mul(b)
                .and_then(|bb| bb.checked_add(8u128.checked_mul(inc as u128)?.checked_mul(tail as u128)?));
            match discriminant {
                Some(discriminant) => (isqrt(discriminant) as i128 - b as i128) / (2 * inc),
                // astronomically long tail: a float estimate, fixed up below
                None => {
                    let (b, inc, tail) = (b as f64, inc as f64, tail as f64);
                    ((-b + (b * b + 8.0 * inc * tail).sqrt()) / (2.0 * inc)) as i128
                }
            }
        };
        let mut m = estimate.clamp(0, MAX_M);
        while m > 0 && sum(m) > tail {
            m -= 1;
        }
        while m < MAX_M && sum(m + 1) <= tail {
            m += 1;
        }
        // MAX_M fits in an i64, the caller reports the round overflow
        Ok(m as i64)
    }

    /// Start of `round` at the current level, knowing that the predecessor block was
    /// produced at `predecessor_timestamp` with `predecessor_round`.
    pub fn timestamp_of_round(
        &self,
        predecessor_timestamp: Timestamp,
        predecessor_round: Round,
        round: Round,
    ) -> Result<Timestamp, RoundError> {
        let level_start = self.level_start(predecessor_timestamp, predecessor_round)?;
        Ok(level_start.checked_add(self.level_offset_of_round(round)?)?)
    }

    /// Re-bases `current_timestamp`, the start of `current_round`, to the start of
    /// `considered_round` of the same level. `considered_round` may be before or
    /// after `current_round`.
    pub fn timestamp_of_another_round_same_level(
        &self,
        current_timestamp: Timestamp,
        current_round: Round,
        considered_round: Round,
    ) -> Result<Timestamp, RoundError> {
        let current_offset = self.level_offset_of_round(current_round)?;
        let considered_offset = self.level_offset_of_round(considered_round)?;
        let shift = considered_offset.as_secs() - current_offset.as_secs();
        let secs = current_timestamp.as_secs().checked_add(shift).ok_or_else(|| {
            tenderbake_time::TimeError::CheckedOperationError("addition error".to_string())
        })?;
        Ok(Timestamp::from_secs(secs))
    }

    /// Round of the current level running at `timestamp`.
    pub fn round_of_timestamp(
        &self,
        predecessor_timestamp: Timestamp,
        predecessor_round: Round,
        timestamp: Timestamp,
    ) -> Result<Round, RoundError> {
        let level_start = self.level_start(predecessor_timestamp, predecessor_round)?;
        if timestamp < level_start {
            return Err(RoundError::TimestampBeforeLevelStart {
                timestamp,
                level_start,
            });
        }
        let level_offset = timestamp.checked_period_since(level_start)?;
        Ok(self.round_and_offset(level_offset)?.round)
    }

    /// Start of round zero of the level following the predecessor block.
    fn level_start(
        &self,
        predecessor_timestamp: Timestamp,
        predecessor_round: Round,
    ) -> Result<Timestamp, RoundError> {
        Ok(predecessor_timestamp.checked_add(self.duration_of_round(predecessor_round)?)?)
    }
}

impl TryFrom<Vec<Period>> for RoundDurations {
    type Error = RoundError;

    fn try_from(value: Vec<Period>) -> Result<Self, Self::Error> {
        RoundDurations::new(value)
    }
}

impl From<RoundDurations> for Vec<Period> {
    fn from(value: RoundDurations) -> Self {
        value.explicit
    }
}

/// Integer square root, rounded down.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn round(r: i32) -> Round {
        Round::of_i32(r).unwrap()
    }

    fn schedules() -> Vec<RoundDurations> {
        vec![
            RoundDurations::from_secs(&[4, 14]).unwrap(),
            RoundDurations::from_secs(&[1, 1]).unwrap(),
            RoundDurations::from_secs(&crate::config::ROUND_DURATIONS).unwrap(),
            RoundDurations::from_secs(&[2, 3, 5, 8]).unwrap(),
            RoundDurations::from_secs(&[3, 3, 3, 7]).unwrap(),
        ]
    }

    #[test]
    fn test_schedule_construction_errors() {
        assert_matches!(
            RoundDurations::from_secs(&[10, 5]),
            Err(RoundError::NonIncreasingRounds { previous: 10, next: 5 })
        );
        assert_matches!(
            RoundDurations::from_secs(&[10]),
            Err(RoundError::NotEnoughRoundDurations(1))
        );
        assert_matches!(
            RoundDurations::from_secs(&[0, 5]),
            Err(RoundError::NonPositiveRoundDuration(0))
        );
        assert!(RoundDurations::from_secs(&[5, 5]).is_ok());
    }

    #[test]
    fn test_schedule_deserialization_is_validated() {
        let durations: RoundDurations = serde_json::from_str("[4, 14]").unwrap();
        assert_eq!(durations.first_round_duration(), Period::from_secs(4));
        assert!(serde_json::from_str::<RoundDurations>("[10, 5]").is_err());
        assert!(serde_json::from_str::<RoundDurations>("[10]").is_err());
        assert!(serde_json::from_str::<Round>("-1").is_err());
    }

    #[test]
    fn test_pred_and_succ() {
        assert_eq!(Round::zero().pred(), Err(RoundError::PredOfZero));
        assert_eq!(round(5).pred().unwrap(), round(4));
        assert_eq!(round(5).succ().unwrap().pred().unwrap(), round(5));
        assert_matches!(Round::of_i32(-3), Err(RoundError::NegativeRound(-3)));
    }

    #[test]
    fn test_durations_are_monotonic() {
        for durations in schedules() {
            let mut previous = Period::ZERO;
            for r in 0..200 {
                let duration = durations.duration_of_round(round(r)).unwrap();
                assert!(duration >= previous);
                previous = duration;
            }
        }
    }

    #[test]
    fn test_offsets_strictly_increase_and_match_durations() {
        for durations in schedules() {
            let mut expected = Period::ZERO;
            for r in 0..200 {
                let offset = durations.level_offset_of_round(round(r)).unwrap();
                assert_eq!(offset, expected, "round {}", r);
                let next = durations.level_offset_of_round(round(r + 1)).unwrap();
                assert!(next > offset);
                expected = expected
                    .checked_add(durations.duration_of_round(round(r)).unwrap())
                    .unwrap();
            }
        }
    }

    #[test]
    fn test_round_and_offset_inverts_level_offset() {
        for durations in schedules() {
            for secs in 0..3000 {
                let level_offset = Period::from_secs(secs);
                let RoundAndOffset { round, offset } =
                    durations.round_and_offset(level_offset).unwrap();
                let start = durations.level_offset_of_round(round).unwrap();
                assert_eq!(start.checked_add(offset).unwrap(), level_offset);
                assert!(offset < durations.duration_of_round(round).unwrap());
            }
        }
    }

    #[test]
    fn test_round_and_offset_far_in_the_tail() {
        let durations = RoundDurations::from_secs(&[4, 14]).unwrap();
        let far = round(100_000);
        let start = durations.level_offset_of_round(far).unwrap();
        let res = durations
            .round_and_offset(start.checked_add(Period::from_secs(3)).unwrap())
            .unwrap();
        assert_eq!(res.round, far);
        assert_eq!(res.offset, Period::from_secs(3));
    }

    #[test]
    fn test_level_offset_overflow_is_reported() {
        let durations = RoundDurations::new(vec![
            Period::of_seconds(1 << 40).unwrap(),
            Period::of_seconds(1 << 41).unwrap(),
        ])
        .unwrap();
        assert!(durations.level_offset_of_round(Round::MAX).is_err());
        assert!(durations.duration_of_round(Round::MAX).is_err());
    }

    #[test]
    fn test_timestamp_round_trip() {
        for durations in schedules() {
            for pred_round in [0, 1, 3, 17] {
                let pred_ts = Timestamp::from_secs(1_000_000);
                for r in 0..100 {
                    let ts = durations
                        .timestamp_of_round(pred_ts, round(pred_round), round(r))
                        .unwrap();
                    assert_eq!(
                        durations
                            .round_of_timestamp(pred_ts, round(pred_round), ts)
                            .unwrap(),
                        round(r)
                    );
                }
            }
        }
    }

    #[test]
    fn test_timestamp_of_round_formula() {
        let durations = RoundDurations::from_secs(&[4, 14]).unwrap();
        let ts = durations
            .timestamp_of_round(Timestamp::from_secs(100), round(1), round(2))
            .unwrap();
        // 100 + duration(1) + (4 + 14)
        assert_eq!(ts, Timestamp::from_secs(132));
    }

    #[test]
    fn test_round_of_timestamp_before_level_start() {
        let durations = RoundDurations::from_secs(&[4, 14]).unwrap();
        let res = durations.round_of_timestamp(
            Timestamp::from_secs(100),
            round(0),
            Timestamp::from_secs(103),
        );
        assert_eq!(
            res,
            Err(RoundError::TimestampBeforeLevelStart {
                timestamp: Timestamp::from_secs(103),
                level_start: Timestamp::from_secs(104),
            })
        );
    }

    #[test]
    fn test_rebasing_is_symmetric() {
        for durations in schedules() {
            let ts = Timestamp::from_secs(5_000);
            for (current, considered) in [(0, 7), (7, 0), (3, 3), (2, 50)] {
                let there = durations
                    .timestamp_of_another_round_same_level(ts, round(current), round(considered))
                    .unwrap();
                let back = durations
                    .timestamp_of_another_round_same_level(there, round(considered), round(current))
                    .unwrap();
                assert_eq!(back, ts);
            }
        }
    }

    #[test]
    fn test_isqrt() {
        for n in 0..10_000u128 {
            let r = isqrt(n);
            assert!(r * r <= n && (r + 1) * (r + 1) > n);
        }
    }
}
