//! Loader error types

use thiserror::Error;

/// Result type for loading operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Loader errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input is not valid JSON
    #[error("could not parse JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not valid CSV
    #[error("could not parse CSV input: {0}")]
    Csv(#[from] ::csv::Error),

    /// The input parsed but has the wrong overall shape
    #[error("unexpected input shape: {detail}")]
    UnexpectedShape { detail: String },

    /// One record of the input is not a document
    #[error("document {index} is malformed: {detail}")]
    BadDocument { index: usize, detail: String },
}
