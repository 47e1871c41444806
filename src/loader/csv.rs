//! CSV document loading
//!
//! The header row names the fields. Cells are sniffed in a fixed order:
//! int, float, bool, ISO date, string. Empty cells load as null so
//! that sparse columns behave like missing document fields under the
//! filled/exists lookups.

use std::io::Read;

use chrono::NaiveDate;

use crate::observability::Logger;
use crate::value::{Document, Value};

use super::errors::LoadResult;

/// Loads documents from a CSV reader; the first record is the header
pub fn documents_from_reader<R: Read>(reader: R) -> LoadResult<Vec<Document>> {
    let mut reader = ::csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut docs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let doc: Document = headers
            .iter()
            .cloned()
            .zip(record.iter().map(parse_cell))
            .collect();
        docs.push(doc);
    }
    Logger::trace("LOAD_CSV", &[("documents", &docs.len().to_string())]);
    Ok(docs)
}

/// Loads documents from CSV text
pub fn documents_from_str(text: &str) -> LoadResult<Vec<Document>> {
    documents_from_reader(text.as_bytes())
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::null();
    }
    if let Ok(n) = cell.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(x) = cell.parse::<f64>() {
        return Value::from(x);
    }
    match cell {
        "true" => return Value::from(true),
        "false" => return Value::from(false),
        _ => {}
    }
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Value::from(date);
    }
    Value::from(cell)
}
