//! Value model for pivotdb
//!
//! Documents are ordered maps of field name to `Value`; the indexable leaf
//! type is `Scalar`. Dates are first-class scalars so that the unwrapper can
//! decompose them into synthetic year/month/day index keys.
//!
//! # Design Principles
//!
//! - Closed tagged unions, no dynamic typing anywhere
//! - Total, deterministic ordering on scalars (index and sort order depend on it)
//! - serde interop: values round-trip through plain JSON shapes

mod document;
mod scalar;
mod unwrap;

pub use document::{Document, Value};
pub use scalar::{DateParts, Scalar};
pub use unwrap::{nest_key, unwrap_document, unwrap_value};
