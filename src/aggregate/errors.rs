//! Aggregation error types
//!
//! Raised only when a lazy reduction is actually forced, never at
//! `count_for` time. The message always names the aggregate, the field key
//! and the root cause so a bad cell in a big cast table can be traced back
//! to its data.

use thiserror::Error;

/// Result type for aggregation operations
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Aggregation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// The input values cannot be reduced by this aggregate
    #[error("could not perform {aggregate} aggregation on key \"{key}\": {cause}")]
    BadValue {
        aggregate: &'static str,
        key: String,
        cause: String,
    },
}

impl AggregateError {
    /// Creates a reduction failure
    pub fn bad_value(
        aggregate: &'static str,
        key: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        AggregateError::BadValue {
            aggregate,
            key: key.into(),
            cause: cause.into(),
        }
    }
}
