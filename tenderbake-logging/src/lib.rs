// Copyright (c) 2021 MASSA LABS <info@massa.net>
//! Structured trace events: `tenderbake_trace!("mempool.filter.refused", { "op": id })`

#[doc(hidden)]
pub use serde_json as __serde_json;
#[doc(hidden)]
pub use tracing as __tracing;

/// Emits a trace-level event named `$evt` with a JSON payload.
#[macro_export]
macro_rules! tenderbake_trace {
    ($evt:expr, $params:tt) => {
        $crate::__tracing::trace!(
            "tenderbake_trace:{}:{}",
            $evt,
            $crate::__serde_json::json!($params)
        );
    };
}
