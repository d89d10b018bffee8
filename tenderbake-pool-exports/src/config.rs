//! Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::{PoolError, PoolResult};
use num::rational::Ratio;
use serde::{Deserialize, Serialize};
use tenderbake_models::amount::Mutez;
use tenderbake_models::config::{
    HARD_GAS_LIMIT_PER_BLOCK, MINIMAL_FEES, MINIMAL_NANOTEZ_PER_BYTE,
    MINIMAL_NANOTEZ_PER_GAS_UNIT,
};
use tenderbake_time::Period;

/// Mempool filter configuration, immutable for a mempool session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// minimal flat fee of a manager operation
    pub minimal_fees: Mutez,
    /// minimal fee per unit of gas limit, in nanotez
    pub minimal_nanotez_per_gas_unit: Ratio<u64>,
    /// minimal fee per byte of operation, in nanotez
    pub minimal_nanotez_per_byte: Ratio<u64>,
    /// keep manager operations whose application failed
    pub allow_script_failure: bool,
    /// tolerance on the local clock when judging consensus operations.
    /// Defaults to the duration of round zero when absent.
    pub clock_drift: Option<Period>,
    /// maximal gas limit of a manager operation batch
    pub hard_gas_limit_per_block: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            minimal_fees: Mutez::from_mutez(MINIMAL_FEES),
            minimal_nanotez_per_gas_unit: Ratio::from_integer(MINIMAL_NANOTEZ_PER_GAS_UNIT),
            minimal_nanotez_per_byte: Ratio::from_integer(MINIMAL_NANOTEZ_PER_BYTE),
            allow_script_failure: true,
            clock_drift: None,
            hard_gas_limit_per_block: HARD_GAS_LIMIT_PER_BLOCK,
        }
    }
}

impl FilterConfig {
    /// Parses a JSON configuration; missing fields take their default value.
    pub fn from_json(json: &str) -> PoolResult<Self> {
        serde_json::from_str(json).map_err(|err| PoolError::ConfigError(err.to_string()))
    }
}
