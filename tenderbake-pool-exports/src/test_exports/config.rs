// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::rational::Ratio;
use tenderbake_models::amount::Mutez;
use tenderbake_time::Period;

use crate::FilterConfig;

impl FilterConfig {
    /// Configuration that never refuses a manager operation for its fees, with an
    /// explicit clock drift
    pub fn free_fees(clock_drift: Option<Period>) -> Self {
        Self {
            minimal_fees: Mutez::zero(),
            minimal_nanotez_per_gas_unit: Ratio::from_integer(0),
            minimal_nanotez_per_byte: Ratio::from_integer(0),
            clock_drift,
            ..Default::default()
        }
    }
}
