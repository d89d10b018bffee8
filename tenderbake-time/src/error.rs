// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// time error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// conversion error
    ConversionError,
    /// checked operation error: {0}
    CheckedOperationError(String),
    /// negative period: {0}s
    NegativePeriod(i64),
}
