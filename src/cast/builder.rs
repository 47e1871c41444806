//! Pivot table construction
//!
//! `cast` groups a query by an ordered list of factor keys, optionally
//! pivots by further keys, and fills the cells with aggregate values:
//!
//! 1. Factor levels are discovered per parent level (a tree); a factor with
//!    no values in its sub-population contributes one null stub level, so
//!    every root-to-leaf path has the same length.
//! 2. Rows are the root-to-leaf paths (one synthetic catch-all row when no
//!    factors were given; it contributes no cell of its own).
//! 3. Pivot columns are the union of pivot values that occur with a
//!    non-zero count in at least one row's sub-population, sorted.
//! 4. Each row gets one aggregate cell per (pivot value, aggregate), then
//!    one total cell per aggregate over the row's unpivoted sub-query.
//!
//! Every row of the result, header included, has the same width; the table
//! printer depends on that.

use crate::aggregate::Aggregate;
use crate::query::Query;
use crate::value::Scalar;

use super::errors::CastResult;
use super::table::{Cell, Table};

/// One concrete value of a grouping factor, with the sub-query filtered to
/// that value and the levels of the next factor nested under it
#[derive(Debug, Clone)]
pub struct Level<'a> {
    value: Scalar,
    query: Query<'a>,
    children: Vec<Level<'a>>,
}

impl<'a> Level<'a> {
    fn new(key: &str, value: Scalar, parent: &Query<'a>) -> Level<'a> {
        // a null level filters like any other: exact-null rewrites to
        // "not filled", which is exactly the population the stub stands for
        let query = parent.find(key, value.clone());
        Level {
            value,
            query,
            children: Vec::new(),
        }
    }

    /// The factor value this level represents
    pub fn value(&self) -> &Scalar {
        &self.value
    }

    /// The sub-query filtered down to this level
    pub fn query(&self) -> &Query<'a> {
        &self.query
    }

    /// Levels of the next factor within this level's sub-population
    pub fn children(&self) -> &[Level<'a>] {
        &self.children
    }
}

/// Discovers the level tree for the given factor keys under a parent query.
///
/// Every factor contributes at least one level per parent (the null stub
/// when the key yields no values), which guarantees uniform row width.
pub fn build_levels<'a>(parent: &Query<'a>, keys: &[&str]) -> CastResult<Vec<Level<'a>>> {
    let Some((&key, rest)) = keys.split_first() else {
        return Ok(Vec::new());
    };

    let values = parent.values_for(key)?;
    let mut levels: Vec<Level<'a>> = if values.is_empty() {
        vec![Level::new(key, Scalar::Null, parent)]
    } else {
        values
            .into_iter()
            .map(|value| Level::new(key, value, parent))
            .collect()
    };

    for level in &mut levels {
        let children = build_levels(&level.query, rest)?;
        level.children = children;
    }
    Ok(levels)
}

/// Collects root-to-leaf paths, depth first
fn gather_paths<'l, 'a>(
    level: &'l Level<'a>,
    path: &mut Vec<&'l Level<'a>>,
    paths: &mut Vec<Vec<&'l Level<'a>>>,
) {
    path.push(level);
    if level.children.is_empty() {
        paths.push(path.clone());
    } else {
        for child in &level.children {
            gather_paths(child, path, paths);
        }
    }
    path.pop();
}

/// Builds a pivot table over the query.
///
/// `factors` are the row-grouping keys, `pivots` the column-grouping keys;
/// both may be empty. With no aggregates, a keyless `Count` is used. The
/// first returned row is the header.
pub fn cast(
    query: &Query<'_>,
    factors: &[&str],
    pivots: &[&str],
    aggregates: &[Aggregate],
) -> CastResult<Table> {
    let default_aggregate = [Aggregate::count()];
    let aggregates: &[Aggregate] = if aggregates.is_empty() {
        &default_aggregate
    } else {
        aggregates
    };

    // group: every row is a level path's cells plus its trailing sub-query
    let mut row_cells: Vec<Vec<Cell>> = Vec::new();
    let mut row_queries: Vec<Query<'_>> = Vec::new();
    if factors.is_empty() {
        // catch-all row over the whole base query; no cell of its own
        row_cells.push(Vec::new());
        row_queries.push(query.clone());
    } else {
        let levels = build_levels(query, factors)?;
        let mut paths = Vec::new();
        for root in &levels {
            let mut path = Vec::new();
            gather_paths(root, &mut path, &mut paths);
        }
        for path in paths {
            row_cells.push(
                path.iter()
                    .map(|level| Cell::Scalar(level.value.clone()))
                    .collect(),
            );
            if let Some(last) = path.last() {
                row_queries.push(last.query.clone());
            }
        }
    }

    // pivot: union of values with a non-zero count in any row, first-seen
    // order while collecting, sorted for emission
    let mut used: Vec<(&str, Vec<Scalar>)> =
        pivots.iter().map(|&key| (key, Vec::new())).collect();
    for row_query in &row_queries {
        for (key, used_values) in used.iter_mut() {
            for value in row_query.values_for(key)? {
                if used_values.contains(&value) {
                    continue;
                }
                if row_query.find(key, value.clone()).count()? > 0 {
                    used_values.push(value);
                }
            }
        }
    }
    for (_, used_values) in used.iter_mut() {
        used_values.sort();
    }

    // heading: factor names, pivot level names, aggregate names
    let mut header: Vec<Cell> = factors
        .iter()
        .map(|&factor| Cell::Text(factor.to_string()))
        .collect();
    for (_, used_values) in &used {
        for value in used_values {
            if aggregates.len() < 2 {
                header.push(Cell::Text(value.to_string()));
            } else {
                for aggregate in aggregates {
                    header.push(Cell::Text(format!("{} {}", value, aggregate)));
                }
            }
        }
    }
    for aggregate in aggregates {
        header.push(Cell::Text(aggregate.to_string()));
    }

    let mut rows = Vec::with_capacity(row_queries.len() + 1);
    rows.push(header);

    // cells: per pivot value then the row totals, left to right
    for (mut cells, row_query) in row_cells.into_iter().zip(row_queries) {
        for (key, used_values) in &used {
            for value in used_values {
                let restricted = row_query.find(key, value.clone());
                for aggregate in aggregates {
                    cells.push(Cell::Aggregate(aggregate.count_for(&restricted)?));
                }
            }
        }
        for aggregate in aggregates {
            cells.push(Cell::Aggregate(aggregate.count_for(&row_query)?));
        }
        rows.push(cells);
    }

    Ok(Table::new(rows))
}
