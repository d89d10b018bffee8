//! Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Interface of the baking mempool: filter configuration, filtering outcomes and the
//! controller trait implemented by the pool worker.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod config;
mod controller_traits;
mod error;
mod types;

pub use config::FilterConfig;
pub use controller_traits::MempoolController;
pub use error::{PoolError, PoolResult};
pub use types::{
    ConsensusFilter, ManagerOperationResult, PrefilterOutcome, Priority, RefusalReason,
};

/// Test utils
#[cfg(feature = "test-exports")]
pub mod test_exports;
