//! JSON document loading
//!
//! Accepts a JSON array of objects. JSON carries no date type, so
//! date-looking strings load as strings; callers that want date semantics
//! build documents with date values directly.

use std::io::Read;

use crate::observability::Logger;
use crate::value::Document;

use super::errors::{LoadError, LoadResult};

/// Loads documents from a JSON string
pub fn documents_from_str(text: &str) -> LoadResult<Vec<Document>> {
    let parsed: serde_json::Value = serde_json::from_str(text)?;
    documents_from_value(parsed)
}

/// Loads documents from a JSON reader
pub fn documents_from_reader<R: Read>(reader: R) -> LoadResult<Vec<Document>> {
    let parsed: serde_json::Value = serde_json::from_reader(reader)?;
    documents_from_value(parsed)
}

fn documents_from_value(parsed: serde_json::Value) -> LoadResult<Vec<Document>> {
    let serde_json::Value::Array(items) = parsed else {
        return Err(LoadError::UnexpectedShape {
            detail: "expected a JSON array of objects".to_string(),
        });
    };

    let mut docs = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        warn_on_precision_loss(index, &item);
        let doc = Document::from_json(item).map_err(|source| LoadError::BadDocument {
            index,
            detail: source.to_string(),
        })?;
        docs.push(doc);
    }
    Logger::trace("LOAD_JSON", &[("documents", &docs.len().to_string())]);
    Ok(docs)
}

/// Integers beyond the i64 range load as floats; advise, don't fail
fn warn_on_precision_loss(index: usize, value: &serde_json::Value) {
    match value {
        serde_json::Value::Number(number) => {
            if number.as_i64().is_none() && number.as_u64().is_some() {
                Logger::warn(
                    "NUMBER_PRECISION_LOSS",
                    &[
                        ("document", &index.to_string()),
                        ("value", &number.to_string()),
                    ],
                );
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                warn_on_precision_loss(index, item);
            }
        }
        serde_json::Value::Object(fields) => {
            for field in fields.values() {
                warn_on_precision_loss(index, field);
            }
        }
        _ => {}
    }
}
