// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::{ModelsError, ModelsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Height of a block in the chain
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Level(u32);

impl Level {
    /// new level from its height
    pub const fn new(level: u32) -> Level {
        Level(level)
    }

    /// the height
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// next level
    pub fn succ(self) -> ModelsResult<Level> {
        self.0
            .checked_add(1)
            .map(Level)
            .ok_or(ModelsError::LevelOverflowError)
    }

    /// `self - other`, as a signed number of levels
    /// ```
    /// # use tenderbake_models::level::Level;
    /// assert_eq!(Level::new(3).diff(Level::new(5)), -2);
    /// ```
    pub fn diff(self, other: Level) -> i64 {
        self.0 as i64 - other.0 as i64
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
