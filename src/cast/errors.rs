//! Cast error types
//!
//! Building a table touches both layers below it: query execution while
//! grouping and pivoting, and aggregation when cells are forced.

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::collection::CollectionError;

/// Result type for table building
pub type CastResult<T> = Result<T, CastError>;

/// Table building errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    /// Query execution failed while grouping or pivoting
    #[error(transparent)]
    Query(#[from] CollectionError),

    /// A cell's reduction failed
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}
