//! Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use tenderbake_models::ModelsError;
use thiserror::Error;

/// pool result
pub type PoolResult<T, E = PoolError> = core::result::Result<T, E>;

/// pool error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum PoolError {
    /// models error: {0}
    ModelsError(#[from] ModelsError),
    /// invalid configuration: {0}
    ConfigError(String),
    /// expected one operation list per validation pass ({expected}), got {got}
    InvalidPassCount {
        /// number of validation passes
        expected: usize,
        /// number of lists received
        got: usize,
    },
}
