//! Observability subsystem for pivotdb
//!
//! The engine is synchronous and in-memory; the only telemetry it emits is
//! a small set of advisory events (index rebuilds, degenerate deletes,
//! loader advisories).
//!
//! # Design Principles
//!
//! - Structured logs (JSON), one line per event
//! - Deterministic key ordering
//! - Synchronous, no buffering
//! - Advisories never fail the operation that emitted them

mod logger;

pub use logger::{Logger, Severity};
