//! Common error types for the core vocabulary.

use thiserror::Error;

/// Errors raised when constructing a temporal interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalIntervalError {
    /// A component of the interval is negative.
    #[error("Invalid negative {unit}: {value}")]
    NegativeComponent { unit: &'static str, value: i32 },

    /// Applying the interval to a timestamp left the representable range.
    #[error("Timestamp out of range after applying interval {0}")]
    OutOfRange(String),
}
