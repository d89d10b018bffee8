// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Data model of the baking mempool: rounds and their clock, levels, operations,
//! block headers and the protocol view.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

/// tez amounts
pub mod amount;
/// block headers
pub mod block_header;
/// protocol and mempool constants
pub mod config;
/// models error
pub mod error;
pub mod fitness;
/// blake3 hashes and identities
pub mod hash;
/// block heights
pub mod level;
/// operations and their shapes
pub mod operation;
pub mod protocol;
pub mod round;

pub use error::{ModelsError, ModelsResult, RoundError};
