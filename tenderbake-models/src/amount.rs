// Copyright (c) 2022 MASSA LABS <info@massa.net>

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of tez in mutez (10^-6 tez). Never overflows silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Ord, PartialOrd, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mutez(u64);

impl Mutez {
    /// Create a zero amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Build from a number of mutez
    pub const fn from_mutez(raw: u64) -> Self {
        Self(raw)
    }

    /// Number of mutez
    pub const fn to_mutez(&self) -> u64 {
        self.0
    }

    /// safely add self to another amount, returning None on overflow
    /// ```
    /// # use tenderbake_models::amount::Mutez;
    /// let res = Mutez::from_mutez(42).checked_add(Mutez::from_mutez(7)).unwrap();
    /// assert_eq!(res, Mutez::from_mutez(49));
    /// assert!(Mutez::from_mutez(u64::MAX).checked_add(Mutez::from_mutez(1)).is_none());
    /// ```
    pub fn checked_add(self, amount: Mutez) -> Option<Self> {
        self.0.checked_add(amount.0).map(Mutez)
    }
}

impl fmt::Display for Mutez {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tez = self.0 / 1_000_000;
        let rest = self.0 % 1_000_000;
        if rest == 0 {
            write!(f, "{}ꜩ", tez)
        } else {
            let frac = format!("{:06}", rest);
            write!(f, "{}.{}ꜩ", tez, frac.trim_end_matches('0'))
        }
    }
}
