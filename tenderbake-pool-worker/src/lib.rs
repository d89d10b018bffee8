//! Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Baking mempool: admission filter and operations waiting to be included in a block

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod controller_impl;
pub mod filter;
pub mod operation_pool;

#[cfg(test)]
mod tests;

use controller_impl::MempoolControllerImpl;
use filter::FilterState;
use operation_pool::OperationPool;
use parking_lot::RwLock;
use std::sync::Arc;
use tenderbake_models::protocol::ProtocolView;
use tenderbake_pool_exports::{FilterConfig, MempoolController};

/// Starts a mempool with an empty pool. The filter keeps every consensus operation
/// until a first head is notified.
pub fn start_mempool_controller(
    config: FilterConfig,
    protocol: Arc<dyn ProtocolView>,
) -> Box<dyn MempoolController> {
    Box::new(MempoolControllerImpl {
        config,
        protocol,
        filter_state: Arc::new(RwLock::new(FilterState::Uninitialized)),
        operation_pool: Arc::new(RwLock::new(OperationPool::default())),
    })
}
