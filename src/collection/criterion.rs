//! Query criteria and lookup types
//!
//! A criterion is a (lookup, value, negate) triple. The lookup string may
//! carry a trailing lookup-type token separated by the collection delimiter
//! (`age__gt`); without one, `exact` is assumed. A trailing token that is
//! not a recognized lookup type is treated as part of the field name, which
//! keeps nested-key lookups like `born__country` working.

use chrono::NaiveDate;

use super::errors::{CollectionError, CollectionResult};
use crate::value::{Scalar, Value};

/// Comparison operator applied between a criterion value and each indexed
/// value.
///
/// `exact` is resolved by direct index lookup; every other type walks the
/// distinct values indexed under the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupType {
    /// Indexed value equals the criterion value
    Exact,
    /// Negated `exact`; rewritten to `exact` with the negate flag flipped
    Not,
    /// Indexed value is greater than the criterion value
    Gt,
    /// Indexed value is less than the criterion value
    Lt,
    /// Indexed value is greater than or equal to the criterion value
    Gte,
    /// Indexed value is less than or equal to the criterion value
    Lte,
    /// Indexed value is a member (or substring) of the criterion value
    In,
    /// Criterion value is a substring of the indexed value
    Contains,
    /// Field is present with a non-null value
    Filled,
    /// Field is present, null allowed
    Exists,
    /// Indexed date's year equals the criterion value
    Year,
    /// Indexed date's month equals the criterion value
    Month,
    /// Indexed date's day of month equals the criterion value
    Day,
    /// Indexed date's weekday (Monday=0) equals the criterion value
    WeekDay,
}

impl LookupType {
    /// Parses a lookup-type token. Returns `None` for unrecognized tokens so
    /// the caller can fall back to treating them as field-name parts.
    pub fn parse(token: &str) -> Option<LookupType> {
        match token {
            "exact" => Some(LookupType::Exact),
            "not" => Some(LookupType::Not),
            "gt" => Some(LookupType::Gt),
            "lt" => Some(LookupType::Lt),
            "gte" => Some(LookupType::Gte),
            "lte" => Some(LookupType::Lte),
            "in" => Some(LookupType::In),
            "contains" => Some(LookupType::Contains),
            "filled" => Some(LookupType::Filled),
            "exists" => Some(LookupType::Exists),
            "year" => Some(LookupType::Year),
            "month" => Some(LookupType::Month),
            "day" => Some(LookupType::Day),
            "week_day" => Some(LookupType::WeekDay),
            _ => None,
        }
    }

    /// Evaluates the comparison between a (coerced) criterion value and one
    /// indexed value.
    pub fn matches(&self, probe: &Value, indexed: &Scalar) -> bool {
        match self {
            LookupType::Exact => probe.as_scalar() == Some(indexed),
            LookupType::Not => probe.as_scalar() != Some(indexed),
            LookupType::Gt => probe.as_scalar().is_some_and(|p| p < indexed),
            LookupType::Lt => probe.as_scalar().is_some_and(|p| indexed < p),
            LookupType::Gte => probe.as_scalar().is_some_and(|p| p <= indexed),
            LookupType::Lte => probe.as_scalar().is_some_and(|p| indexed <= p),
            LookupType::In => match probe {
                Value::List(items) => {
                    items.iter().any(|item| item.as_scalar() == Some(indexed))
                }
                Value::Scalar(Scalar::Str(text)) => indexed
                    .as_str()
                    .is_some_and(|fragment| text.contains(fragment)),
                _ => false,
            },
            LookupType::Contains => match probe.as_scalar() {
                Some(Scalar::Str(fragment)) => {
                    indexed.as_str().is_some_and(|text| text.contains(fragment.as_str()))
                }
                _ => false,
            },
            LookupType::Filled => !indexed.is_null(),
            LookupType::Exists => true,
            LookupType::Year => Self::date_part_eq(probe, indexed, |p| p.year),
            LookupType::Month => Self::date_part_eq(probe, indexed, |p| p.month),
            LookupType::Day => Self::date_part_eq(probe, indexed, |p| p.day),
            LookupType::WeekDay => Self::date_part_eq(probe, indexed, |p| p.week_day),
        }
    }

    fn date_part_eq(
        probe: &Value,
        indexed: &Scalar,
        part: impl Fn(crate::value::DateParts) -> i64,
    ) -> bool {
        let Some(parts) = indexed.date_parts() else {
            return false;
        };
        probe
            .as_scalar()
            .and_then(Scalar::as_f64)
            .is_some_and(|n| n == part(parts) as f64)
    }
}

/// One filter condition of a query
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// Field key, optionally suffixed with a lookup-type token
    pub lookup: String,
    /// Comparison value; a list for `in`-style containment
    pub value: Value,
    /// Inverts the criterion's meaning
    pub negate: bool,
}

impl Criterion {
    /// Creates a criterion
    pub fn new(lookup: impl Into<String>, value: impl Into<Value>, negate: bool) -> Self {
        Self {
            lookup: lookup.into(),
            value: value.into(),
            negate,
        }
    }

    /// Splits the lookup into (field key, lookup type).
    ///
    /// Only the trailing token is inspected; unrecognized tokens fold back
    /// into the field name with `exact` semantics.
    pub fn resolve(&self, delimiter: &str) -> (String, LookupType) {
        if let Some((head, tail)) = self.lookup.rsplit_once(delimiter) {
            if let Some(lookup_type) = LookupType::parse(tail) {
                return (head.to_string(), lookup_type);
            }
        }
        (self.lookup.clone(), LookupType::Exact)
    }
}

/// Coerces a criterion value so it can be compared against an indexed value.
///
/// Only date comparisons coerce: a string probe is parsed as `YYYY-MM-DD`
/// (failure is a `TypeMismatch`), and date/datetime probes are aligned with
/// the indexed variant. Everything else passes through untouched.
pub fn coerce_probe(value: &Value, indexed: &Scalar) -> CollectionResult<Value> {
    let wants_datetime = match indexed {
        Scalar::Date(_) => false,
        Scalar::DateTime(_) => true,
        _ => return Ok(value.clone()),
    };

    let Some(scalar) = value.as_scalar() else {
        return Ok(value.clone());
    };

    let date = match scalar {
        Scalar::Str(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            CollectionError::TypeMismatch {
                value: text.clone(),
                indexed: indexed.to_string(),
            }
        })?,
        Scalar::DateTime(dt) if !wants_datetime => dt.date(),
        Scalar::Date(d) if wants_datetime => *d,
        _ => return Ok(value.clone()),
    };

    if wants_datetime {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        Ok(Value::from(midnight))
    } else {
        Ok(Value::from(date))
    }
}
