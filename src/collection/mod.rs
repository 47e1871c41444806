//! Collection subsystem for pivotdb
//!
//! Owns the backing document sequence and the inverted index over unwrapped
//! fields, and implements the multi-condition id resolver (`find_ids`).
//!
//! # Design Principles
//!
//! - In-memory only: no persistence, no recovery path
//! - Deterministic: BTreeMap iteration order, ascending id results
//! - Deletes tombstone; primary keys are positions and never move
//! - The index is derived state; rebuilding it from the documents is always
//!   legal and is the only remedy after direct document edits
//!
//! # Invariants
//!
//! - Every (key, value) pair unwrapped from a live document appears in the
//!   index with that document's id, once per occurrence
//! - Removing a document removes all its postings and prunes empty branches
//! - `find_ids` with no criteria yields exactly the live ids

mod collection;
mod criterion;
mod errors;
mod index;

pub use collection::{Collection, DEFAULT_DELIMITER};
pub use criterion::{coerce_probe, Criterion, LookupType};
pub use errors::{CollectionError, CollectionResult};
pub use index::{DocId, InvertedIndex};
