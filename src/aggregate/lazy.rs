//! Lazy aggregate results
//!
//! `count_for` returns an `AggregateValue`: the N/A sentinel, an
//! already-known scalar (keyless count), or a deferred reduction. Forcing a
//! deferred reduction runs `reduce` at most once and caches the scalar; a
//! reduction error surfaces at force time, not at collection time.

use std::fmt;

use once_cell::unsync::OnceCell;

use crate::value::{Scalar, Value};

use super::errors::AggregateResult;
use super::manager::{reduce, AggregateKind};

/// A reduction that has its inputs but has not necessarily run yet
#[derive(Debug, Clone)]
pub struct LazyReduction {
    kind: AggregateKind,
    key: String,
    values: Vec<Value>,
    cell: OnceCell<Scalar>,
}

impl LazyReduction {
    /// Wraps collected input values for deferred reduction
    pub(crate) fn new(kind: AggregateKind, key: String, values: Vec<Value>) -> Self {
        Self {
            kind,
            key,
            values,
            cell: OnceCell::new(),
        }
    }

    /// Number of collected input values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no input values were collected
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Runs the reduction (once) and returns the cached scalar
    pub fn force(&self) -> AggregateResult<&Scalar> {
        self.cell
            .get_or_try_init(|| reduce(self.kind, &self.key, &self.values))
    }
}

/// Outcome of `Aggregate::count_for`
#[derive(Debug, Clone)]
pub enum AggregateValue {
    /// Not applicable: no usable input values. Distinct from zero.
    Na,
    /// Known without reduction (keyless count)
    Ready(Scalar),
    /// Deferred reduction
    Lazy(LazyReduction),
}

impl AggregateValue {
    /// The N/A sentinel
    pub fn na() -> Self {
        AggregateValue::Na
    }

    /// An already-computed result
    pub fn ready(scalar: Scalar) -> Self {
        AggregateValue::Ready(scalar)
    }

    /// A deferred reduction
    pub(crate) fn lazy(reduction: LazyReduction) -> Self {
        AggregateValue::Lazy(reduction)
    }

    /// Returns true for the N/A sentinel
    pub fn is_na(&self) -> bool {
        matches!(self, AggregateValue::Na)
    }

    /// Forces the result. `Ok(None)` is the N/A sentinel.
    pub fn force(&self) -> AggregateResult<Option<&Scalar>> {
        match self {
            AggregateValue::Na => Ok(None),
            AggregateValue::Ready(scalar) => Ok(Some(scalar)),
            AggregateValue::Lazy(reduction) => reduction.force().map(Some),
        }
    }

    /// Forces and coerces to an integer where the result is numeric
    pub fn as_int(&self) -> AggregateResult<Option<i64>> {
        Ok(self.force()?.and_then(|scalar| match scalar {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(x) => Some(*x as i64),
            _ => None,
        }))
    }

    /// Forces and coerces to a float where the result is numeric
    pub fn as_f64(&self) -> AggregateResult<Option<f64>> {
        Ok(self.force()?.and_then(Scalar::as_f64))
    }
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.force() {
            Ok(None) => write!(f, "N/A"),
            Ok(Some(scalar)) => write!(f, "{}", scalar),
            Err(_) => write!(f, "<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_is_distinct_from_zero() {
        let na = AggregateValue::na();
        assert!(na.is_na());
        assert_eq!(na.force().unwrap(), None);
        assert_eq!(na.to_string(), "N/A");

        let zero = AggregateValue::ready(Scalar::Int(0));
        assert!(!zero.is_na());
        assert_eq!(zero.as_int().unwrap(), Some(0));
    }

    #[test]
    fn test_lazy_reduction_is_memoized() {
        let lazy = LazyReduction::new(
            AggregateKind::Sum,
            "age".to_string(),
            vec![Value::from(1), Value::from(2)],
        );
        let first = lazy.force().unwrap() as *const Scalar;
        let second = lazy.force().unwrap() as *const Scalar;
        assert_eq!(first, second);
        assert_eq!(lazy.force().unwrap(), &Scalar::Int(3));
    }

    #[test]
    fn test_error_surfaces_at_force_time() {
        let lazy = LazyReduction::new(
            AggregateKind::Sum,
            "age".to_string(),
            vec![Value::from("old")],
        );
        // constructing was fine; forcing is not
        assert!(lazy.force().is_err());
    }

    #[test]
    fn test_coercions() {
        let avg = AggregateValue::ready(Scalar::Float(15.0));
        assert_eq!(avg.as_f64().unwrap(), Some(15.0));
        assert_eq!(avg.as_int().unwrap(), Some(15));
    }
}
