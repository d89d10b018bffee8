// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Signed time management, in seconds.
//!
//! `Timestamp` is a point in time (seconds since 01/01/1970), `Period` is a non-negative
//! span of time. All arithmetic is checked: overflows are reported, never wrapped.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
pub use error::TimeError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Point in time, seconds since 01/01/1970 (may be negative).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

/// Non-negative span of time, in seconds.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Period(i64);

impl Timestamp {
    /// Builds a timestamp from seconds since the epoch.
    /// ```
    /// # use tenderbake_time::*;
    /// let ts = Timestamp::from_secs(42);
    /// assert_eq!(ts.as_secs(), 42);
    /// ```
    pub const fn from_secs(value: i64) -> Self {
        Timestamp(value)
    }

    /// Seconds since the epoch.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// ```
    /// # use tenderbake_time::*;
    /// let ts = Timestamp::from_secs(40);
    /// let res = ts.checked_add(Period::from_secs(2)).unwrap();
    /// assert_eq!(res, Timestamp::from_secs(42));
    /// assert!(Timestamp::from_secs(i64::MAX).checked_add(Period::from_secs(1)).is_err());
    /// ```
    pub fn checked_add(self, p: Period) -> Result<Self, TimeError> {
        self.0
            .checked_add(p.0)
            .ok_or_else(|| TimeError::CheckedOperationError("addition error".to_string()))
            .map(Timestamp)
    }

    /// ```
    /// # use tenderbake_time::*;
    /// let ts = Timestamp::from_secs(42);
    /// let res = ts.checked_sub(Period::from_secs(50)).unwrap();
    /// assert_eq!(res, Timestamp::from_secs(-8));
    /// ```
    pub fn checked_sub(self, p: Period) -> Result<Self, TimeError> {
        self.0
            .checked_sub(p.0)
            .ok_or_else(|| TimeError::CheckedOperationError("subtraction error".to_string()))
            .map(Timestamp)
    }

    /// Signed difference `self - other`, in seconds.
    /// ```
    /// # use tenderbake_time::*;
    /// let t1 = Timestamp::from_secs(7);
    /// let t2 = Timestamp::from_secs(42);
    /// assert_eq!(t1.checked_diff(t2).unwrap(), -35);
    /// ```
    pub fn checked_diff(self, other: Timestamp) -> Result<i64, TimeError> {
        self.0
            .checked_sub(other.0)
            .ok_or_else(|| TimeError::CheckedOperationError("difference error".to_string()))
    }

    /// Elapsed period since `earlier`, fails if `earlier` is after `self`.
    pub fn checked_period_since(self, earlier: Timestamp) -> Result<Period, TimeError> {
        Period::of_seconds(self.checked_diff(earlier)?)
    }

    /// RFC 3339 notation, if the timestamp fits in the calendar range.
    /// ```
    /// # use tenderbake_time::*;
    /// let ts = Timestamp::from_secs(1_640_995_200);
    /// assert_eq!(ts.to_notation().unwrap(), String::from("2022-01-01T00:00:00Z"))
    /// ```
    pub fn to_notation(&self) -> Result<String, TimeError> {
        let date_time =
            OffsetDateTime::from_unix_timestamp(self.0).map_err(|_| TimeError::ConversionError)?;
        date_time
            .format(&Rfc3339)
            .map_err(|_| TimeError::ConversionError)
    }

    /// Parses an RFC 3339 date.
    pub fn of_notation(s: &str) -> Result<Self, TimeError> {
        let date_time =
            OffsetDateTime::parse(s, &Rfc3339).map_err(|_| TimeError::ConversionError)?;
        Ok(Timestamp(date_time.unix_timestamp()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_notation() {
            Ok(notation) => write!(f, "{}", notation),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimeError;

    /// Accepts either an RFC 3339 date or a number of seconds.
    /// ```
    /// # use tenderbake_time::*;
    /// # use std::str::FromStr;
    /// assert_eq!(Timestamp::from_str("42").unwrap(), Timestamp::from_secs(42));
    /// assert_eq!(
    ///     Timestamp::from_str("2022-01-01T00:00:00Z").unwrap(),
    ///     Timestamp::from_secs(1_640_995_200)
    /// );
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match i64::from_str(s) {
            Ok(secs) => Ok(Timestamp(secs)),
            Err(_) => Timestamp::of_notation(s),
        }
    }
}

impl Period {
    /// The empty period.
    pub const ZERO: Period = Period(0);

    /// Conversion from a number of seconds. Cannot fail: any `u32` is a valid period.
    /// ```
    /// # use tenderbake_time::*;
    /// let p = Period::from_secs(42);
    /// assert_eq!(p.as_secs(), 42);
    /// ```
    pub const fn from_secs(value: u32) -> Self {
        Period(value as i64)
    }

    /// Checked conversion from a signed number of seconds.
    /// ```
    /// # use tenderbake_time::*;
    /// assert_eq!(Period::of_seconds(3).unwrap(), Period::from_secs(3));
    /// assert_eq!(Period::of_seconds(-1), Err(TimeError::NegativePeriod(-1)));
    /// ```
    pub fn of_seconds(value: i64) -> Result<Self, TimeError> {
        if value < 0 {
            return Err(TimeError::NegativePeriod(value));
        }
        Ok(Period(value))
    }

    /// Number of seconds.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Whether the period is empty.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// ```
    /// # use tenderbake_time::*;
    /// let res = Period::from_secs(42).checked_add(Period::from_secs(7)).unwrap();
    /// assert_eq!(res, Period::from_secs(49));
    /// ```
    pub fn checked_add(self, p: Period) -> Result<Self, TimeError> {
        self.0
            .checked_add(p.0)
            .ok_or_else(|| TimeError::CheckedOperationError("addition error".to_string()))
            .map(Period)
    }

    /// Fails when the result would be negative.
    /// ```
    /// # use tenderbake_time::*;
    /// let res = Period::from_secs(42).checked_sub(Period::from_secs(7)).unwrap();
    /// assert_eq!(res, Period::from_secs(35));
    /// assert!(Period::from_secs(7).checked_sub(Period::from_secs(42)).is_err());
    /// ```
    pub fn checked_sub(self, p: Period) -> Result<Self, TimeError> {
        let res = self
            .0
            .checked_sub(p.0)
            .ok_or_else(|| TimeError::CheckedOperationError("subtraction error".to_string()))?;
        Period::of_seconds(res)
    }

    /// Multiplication by a non-negative factor.
    /// ```
    /// # use tenderbake_time::*;
    /// let res = Period::from_secs(42).checked_mul(7).unwrap();
    /// assert_eq!(res, Period::from_secs(294));
    /// assert!(Period::from_secs(42).checked_mul(-1).is_err());
    /// ```
    pub fn checked_mul(self, n: i64) -> Result<Self, TimeError> {
        if n < 0 {
            return Err(TimeError::CheckedOperationError(
                "multiplication by a negative factor".to_string(),
            ));
        }
        self.0
            .checked_mul(n)
            .ok_or_else(|| TimeError::CheckedOperationError("multiplication error".to_string()))
            .map(Period)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<i64> for Period {
    type Error = TimeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Period::of_seconds(value)
    }
}

impl From<Period> for i64 {
    fn from(value: Period) -> Self {
        value.0
    }
}
