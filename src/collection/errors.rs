//! Collection error types
//!
//! Two failures exist at this layer: touching an id outside the backing
//! sequence, and a criterion value that cannot be coerced for comparison
//! against an indexed date. Both propagate to the caller uncaught; there is
//! no retry logic anywhere in the engine.

use thiserror::Error;

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Collection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// An id outside the backing sequence was requested
    #[error("tried to access item {id} in a collection which contains only {len} items")]
    OutOfRange { id: usize, len: usize },

    /// A criterion value could not be coerced to the indexed value's type
    #[error("could not coerce \"{value}\" to match indexed value \"{indexed}\"")]
    TypeMismatch { value: String, indexed: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_names_id_and_size() {
        let err = CollectionError::OutOfRange { id: 7, len: 3 };
        let text = err.to_string();
        assert!(text.contains("item 7"));
        assert!(text.contains("only 3 items"));
    }

    #[test]
    fn test_type_mismatch_names_both_values() {
        let err = CollectionError::TypeMismatch {
            value: "not-a-date".to_string(),
            indexed: "2009-06-15".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("not-a-date"));
        assert!(text.contains("2009-06-15"));
    }
}
