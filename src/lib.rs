//! pivotdb - an embedded, deterministic, in-memory query and pivot engine
//! for semi-structured records
//!
//! Documents (nested key/value records) are indexed into an inverted
//! key -> value -> ids mapping; queries are lazy, chainable filters over
//! that index; the cast layer groups, pivots and aggregates query results
//! into fixed-width tables.

pub mod aggregate;
pub mod cast;
pub mod collection;
pub mod loader;
pub mod observability;
pub mod query;
pub mod value;
