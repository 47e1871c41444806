//! Query subsystem for pivotdb
//!
//! A `Query` is a chainable, deferred description of a filter over one
//! collection: criteria plus an optional ordering. Nothing executes until
//! the result is counted, indexed or iterated, and the resolved id list is
//! memoized for the lifetime of that query instance.
//!
//! # Design Principles
//!
//! - `find`/`exclude`/`order_by` never mutate; they return new queries with
//!   deep-copied criteria and a fresh execution cache
//! - Execution happens at most once per query instance
//! - Results are deterministic: ascending ids, or the documented
//!   posting-list walk when an ordering is set
//! - Queries hold a read-only reference to their collection

mod document;
mod query;

pub use document::DocumentView;
pub use query::{Query, SortKey};
