//! R-style summary statistics
//!
//! One table row of min / lower quartile / median / average / upper
//! quartile / max for a key, built with the same aggregates and table model
//! as `cast`.

use crate::aggregate::Aggregate;
use crate::query::Query;

use super::errors::CastResult;
use super::table::{Cell, Table};

/// Builds the six-column summary table for a key within a query
pub fn summary(query: &Query<'_>, key: &str) -> CastResult<Table> {
    let header = ["min", "1st qu.", "median", "average", "3rd qu.", "max"]
        .iter()
        .map(|&label| Cell::Text(label.to_string()))
        .collect();

    let aggregates = [
        Aggregate::min(key),
        Aggregate::qu1(key),
        Aggregate::median(key),
        Aggregate::avg(key),
        Aggregate::qu3(key),
        Aggregate::max(key),
    ];
    let mut cells = Vec::with_capacity(aggregates.len());
    for aggregate in &aggregates {
        cells.push(Cell::Aggregate(aggregate.count_for(query)?));
    }

    Ok(Table::new(vec![header, cells]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::value::Document;
    use serde_json::json;

    #[test]
    fn test_summary_shape() {
        let docs = [10, 20, 30, 40]
            .iter()
            .map(|&age| Document::from_json(json!({ "age": age })).unwrap())
            .collect();
        let coll = Collection::new(docs);
        let table = summary(&coll.all(), "age").unwrap();

        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.width(), 6);
        let stats: Vec<String> = table.rows()[1]
            .iter()
            .map(|cell| cell.render().unwrap())
            .collect();
        // min, qu1 (median of [10]), median, average, qu3 (median of [40]), max
        assert_eq!(stats, vec!["10", "10", "25.0", "25.0", "40", "40"]);
    }
}
