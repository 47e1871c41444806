//! Aggregation managers and the reduction dispatcher
//!
//! An `Aggregate` pairs a kind with an optional target key and an N/A
//! policy. `count_for` pulls the key's value from every document of a query
//! and hands the survivors to a lazy reduction; `reduce` is the single
//! dispatch point for every kind.

use std::collections::BTreeSet;
use std::fmt;

use crate::collection::CollectionResult;
use crate::query::Query;
use crate::value::{Scalar, Value};

use super::errors::{AggregateError, AggregateResult};
use super::lazy::{AggregateValue, LazyReduction};

/// The closed set of aggregation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// Distinct value count (or raw document count when keyless)
    Count,
    /// Arithmetic sum
    Sum,
    /// Arithmetic mean, never truncated before dividing
    Avg,
    /// Smallest value by the scalar ordering
    Min,
    /// Largest value by the scalar ordering
    Max,
    /// Middle value; even-length inputs average the two middle values
    Median,
    /// Lower-quarter approximation (median of the first len/4 sorted values)
    Qu1,
    /// Upper-quarter approximation (median of the sorted values from
    /// (len/4)*3 on)
    Qu3,
}

impl AggregateKind {
    /// Display name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "Count",
            AggregateKind::Sum => "Sum",
            AggregateKind::Avg => "Avg",
            AggregateKind::Min => "Min",
            AggregateKind::Max => "Max",
            AggregateKind::Median => "Median",
            AggregateKind::Qu1 => "Qu1",
            AggregateKind::Qu3 => "Qu3",
        }
    }
}

/// Policy applied when a document misses the target key (or holds null)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaPolicy {
    /// Drop the document from the computation
    #[default]
    Skip,
    /// The whole aggregate becomes "not applicable" on the first miss
    Reject,
}

/// A stateless aggregation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    kind: AggregateKind,
    key: Option<String>,
    na_policy: NaPolicy,
}

impl Aggregate {
    fn new(kind: AggregateKind, key: Option<String>) -> Self {
        Self {
            kind,
            key,
            na_policy: NaPolicy::default(),
        }
    }

    /// Raw document count; bypasses value extraction entirely
    pub fn count() -> Self {
        Self::new(AggregateKind::Count, None)
    }

    /// Distinct values of `key`
    pub fn count_of(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Count, Some(key.into()))
    }

    /// Sum of `key`
    pub fn sum(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Sum, Some(key.into()))
    }

    /// Mean of `key`
    pub fn avg(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Avg, Some(key.into()))
    }

    /// Minimum of `key`
    pub fn min(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Min, Some(key.into()))
    }

    /// Maximum of `key`
    pub fn max(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Max, Some(key.into()))
    }

    /// Median of `key`
    pub fn median(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Median, Some(key.into()))
    }

    /// Lower-quartile approximation of `key`
    pub fn qu1(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Qu1, Some(key.into()))
    }

    /// Upper-quartile approximation of `key`
    pub fn qu3(key: impl Into<String>) -> Self {
        Self::new(AggregateKind::Qu3, Some(key.into()))
    }

    /// Replaces the N/A policy
    pub fn with_na_policy(mut self, policy: NaPolicy) -> Self {
        self.na_policy = policy;
        self
    }

    /// The aggregate's kind
    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    /// The target key, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Collects the target values of every document matching the query and
    /// returns the (lazy) aggregate over them.
    ///
    /// Query execution happens here; the reduction itself is deferred to the
    /// first force of the returned value.
    pub fn count_for(&self, query: &Query<'_>) -> CollectionResult<AggregateValue> {
        let Some(key) = self.key.as_deref() else {
            // keyless count: no target field, no N/A handling
            let total = query.count()?;
            return Ok(AggregateValue::ready(Scalar::Int(total as i64)));
        };

        let mut values = Vec::new();
        for view in query.documents()? {
            let value = view.get(key);
            match value {
                None | Some(Value::Scalar(Scalar::Null)) => match self.na_policy {
                    NaPolicy::Reject => return Ok(AggregateValue::na()),
                    NaPolicy::Skip => continue,
                },
                Some(value) => values.push(value.clone()),
            }
        }

        if values.is_empty() {
            return Ok(AggregateValue::na());
        }
        Ok(AggregateValue::lazy(LazyReduction::new(
            self.kind,
            key.to_string(),
            values,
        )))
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.name(), self.key.as_deref().unwrap_or("all"))
    }
}

/// Reduces collected values with the given kind.
///
/// The single dispatch point for every aggregate; errors carry the kind
/// name, the key and the offending cause.
pub(crate) fn reduce(
    kind: AggregateKind,
    key: &str,
    values: &[Value],
) -> AggregateResult<Scalar> {
    match kind {
        AggregateKind::Count => {
            let distinct: BTreeSet<&Scalar> = scalars(kind, key, values)?.into_iter().collect();
            Ok(Scalar::Int(distinct.len() as i64))
        }
        AggregateKind::Sum => numeric_sum(kind, key, values),
        AggregateKind::Avg => {
            let total = match numeric_sum(kind, key, values)? {
                Scalar::Int(n) => n as f64,
                Scalar::Float(x) => x,
                _ => unreachable!("numeric_sum yields numbers"),
            };
            Ok(Scalar::Float(total / values.len() as f64))
        }
        AggregateKind::Min => {
            let sorted = sorted_scalars(kind, key, values)?;
            Ok(sorted[0].clone())
        }
        AggregateKind::Max => {
            let sorted = sorted_scalars(kind, key, values)?;
            Ok(sorted[sorted.len() - 1].clone())
        }
        AggregateKind::Median => {
            let sorted = sorted_scalars(kind, key, values)?;
            median_of(kind, key, &sorted)
        }
        AggregateKind::Qu1 => {
            let sorted = sorted_scalars(kind, key, values)?;
            let quarter = sorted.len() / 4;
            median_of(kind, key, &sorted[..quarter])
        }
        AggregateKind::Qu3 => {
            let sorted = sorted_scalars(kind, key, values)?;
            let start = (sorted.len() / 4) * 3;
            median_of(kind, key, &sorted[start..])
        }
    }
}

/// Scalar views of the values; composite values cannot be reduced
fn scalars<'v>(
    kind: AggregateKind,
    key: &str,
    values: &'v [Value],
) -> AggregateResult<Vec<&'v Scalar>> {
    values
        .iter()
        .map(|value| {
            value.as_scalar().ok_or_else(|| {
                AggregateError::bad_value(
                    kind.name(),
                    key,
                    format!("expected a scalar, got {}", value),
                )
            })
        })
        .collect()
}

fn sorted_scalars<'v>(
    kind: AggregateKind,
    key: &str,
    values: &'v [Value],
) -> AggregateResult<Vec<&'v Scalar>> {
    let mut scalars = scalars(kind, key, values)?;
    scalars.sort();
    Ok(scalars)
}

fn numeric_sum(kind: AggregateKind, key: &str, values: &[Value]) -> AggregateResult<Scalar> {
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut saw_float = false;
    for value in values {
        match value.as_scalar() {
            Some(Scalar::Int(n)) => int_sum += n,
            Some(Scalar::Float(x)) => {
                saw_float = true;
                float_sum += x;
            }
            _ => {
                return Err(AggregateError::bad_value(
                    kind.name(),
                    key,
                    format!("expected a number, got {}", value),
                ))
            }
        }
    }
    if saw_float {
        Ok(Scalar::Float(float_sum + int_sum as f64))
    } else {
        Ok(Scalar::Int(int_sum))
    }
}

/// Median of already-sorted scalars.
///
/// Odd length yields the middle element unchanged; even length averages the
/// two middle elements exactly. The empty slice (a quartile slice of fewer
/// than four values) yields 0.0.
fn median_of(kind: AggregateKind, key: &str, sorted: &[&Scalar]) -> AggregateResult<Scalar> {
    if sorted.is_empty() {
        return Ok(Scalar::Float(0.0));
    }
    let middle = sorted.len() >> 1;
    if sorted.len() % 2 == 1 {
        return Ok(sorted[middle].clone());
    }
    let lower = sorted[middle - 1];
    let upper = sorted[middle];
    match (lower.as_f64(), upper.as_f64()) {
        (Some(a), Some(b)) => Ok(Scalar::Float((a + b) / 2.0)),
        _ => Err(AggregateError::bad_value(
            kind.name(),
            key,
            format!("expected numbers, got {} and {}", lower, upper),
        )),
    }
}
