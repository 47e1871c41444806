//! Field unwrapping for index construction
//!
//! Flattens a document's nested, listy, and date-valued fields into a flat
//! multiset of (key, scalar) pairs:
//!
//! - lists contribute one posting per element (duplicates included)
//! - nested maps contribute delimiter-joined keys (`born__country`)
//! - dates contribute the literal date plus synthetic `__year`, `__month`
//!   and `__day` integer postings, so date-part lookups can hit the index
//!   directly

use super::document::{Document, Value};
use super::scalar::Scalar;

/// Joins a parent key and a nested key with the collection delimiter
pub fn nest_key(parent: &str, key: &str, delimiter: &str) -> String {
    let mut nested = String::with_capacity(parent.len() + delimiter.len() + key.len());
    nested.push_str(parent);
    nested.push_str(delimiter);
    nested.push_str(key);
    nested
}

/// Unwraps a single field value into flat (key, scalar) postings
pub fn unwrap_value(key: &str, value: &Value, delimiter: &str, out: &mut Vec<(String, Scalar)>) {
    match value {
        Value::List(items) => {
            for item in items {
                unwrap_value(key, item, delimiter, out);
            }
        }
        Value::Map(fields) => {
            for (inner_key, inner_value) in fields {
                let nested = nest_key(key, inner_key, delimiter);
                unwrap_value(&nested, inner_value, delimiter, out);
            }
        }
        Value::Scalar(scalar) => {
            out.push((key.to_string(), scalar.clone()));
            if let Some(parts) = scalar.date_parts() {
                out.push((nest_key(key, "year", delimiter), Scalar::Int(parts.year)));
                out.push((nest_key(key, "month", delimiter), Scalar::Int(parts.month)));
                out.push((nest_key(key, "day", delimiter), Scalar::Int(parts.day)));
            }
        }
    }
}

/// Unwraps every field of a document
pub fn unwrap_document(doc: &Document, delimiter: &str) -> Vec<(String, Scalar)> {
    let mut out = Vec::new();
    for (key, value) in doc.iter() {
        unwrap_value(key, value, delimiter, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_scalar_passthrough() {
        let mut out = Vec::new();
        unwrap_value("age", &Value::from(49), "__", &mut out);
        assert_eq!(out, vec![("age".to_string(), Scalar::Int(49))]);
    }

    #[test]
    fn test_list_duplicates_kept() {
        let value = Value::from(vec![Value::from("x"), Value::from("x"), Value::from("x")]);
        let mut out = Vec::new();
        unwrap_value("tag", &value, "__", &mut out);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|(k, v)| k == "tag" && *v == Scalar::from("x")));
    }

    #[test]
    fn test_nested_maps_compose_delimiter() {
        let doc = Document::from_json(json!({
            "born": {"place": {"country": "USA"}}
        }))
        .unwrap();
        let out = unwrap_document(&doc, "__");
        assert_eq!(
            out,
            vec![("born__place__country".to_string(), Scalar::from("USA"))]
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let doc = Document::from_json(json!({"born": {"country": "UK"}})).unwrap();
        let out = unwrap_document(&doc, ".");
        assert_eq!(out[0].0, "born.country");
    }

    #[test]
    fn test_date_decomposition() {
        let date = NaiveDate::from_ymd_opt(2009, 6, 15).unwrap();
        let mut out = Vec::new();
        unwrap_value("pub", &Value::from(date), "__", &mut out);

        assert_eq!(out[0], ("pub".to_string(), Scalar::Date(date)));
        assert_eq!(out[1], ("pub__year".to_string(), Scalar::Int(2009)));
        assert_eq!(out[2], ("pub__month".to_string(), Scalar::Int(6)));
        assert_eq!(out[3], ("pub__day".to_string(), Scalar::Int(15)));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_list_of_maps() {
        let doc = Document::from_json(json!({
            "jobs": [{"title": "engineer"}, {"title": "author"}]
        }))
        .unwrap();
        let out = unwrap_document(&doc, "__");
        assert_eq!(
            out,
            vec![
                ("jobs__title".to_string(), Scalar::from("engineer")),
                ("jobs__title".to_string(), Scalar::from("author")),
            ]
        );
    }
}
