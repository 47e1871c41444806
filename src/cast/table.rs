//! Table model and ASCII rendering
//!
//! A table is a 2-D array of heterogeneous cells (header text, level
//! scalars, lazy aggregate values) with uniform row width. Rendering forces
//! the lazy cells; that is the moment deferred aggregation errors surface.

use std::fmt;

use crate::aggregate::{AggregateResult, AggregateValue};
use crate::value::Scalar;

/// One table cell
#[derive(Debug, Clone)]
pub enum Cell {
    /// Header text
    Text(String),
    /// A grouping level's value
    Scalar(Scalar),
    /// An aggregate result, possibly not yet computed
    Aggregate(AggregateValue),
}

impl Cell {
    /// Renders the cell, forcing it when lazy.
    ///
    /// Floats print with one decimal place; the N/A sentinel prints as the
    /// literal `N/A`.
    pub fn render(&self) -> AggregateResult<String> {
        match self {
            Cell::Text(text) => Ok(text.clone()),
            Cell::Scalar(scalar) => Ok(render_scalar(scalar)),
            Cell::Aggregate(value) => match value.force()? {
                None => Ok("N/A".to_string()),
                Some(scalar) => Ok(render_scalar(scalar)),
            },
        }
    }
}

fn render_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Float(x) => format!("{:.1}", x),
        other => other.to_string(),
    }
}

/// A built table; the first row is the header
#[derive(Debug, Clone)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub(crate) fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// All rows, header first
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// The header row
    pub fn header(&self) -> &[Cell] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of columns (uniform across rows)
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Renders the table as a fixed-width ASCII box.
    ///
    /// Column widths are the maximum rendered cell width per column; cells
    /// are right-justified; rule lines delimit the header and the last row.
    pub fn render(&self) -> AggregateResult<String> {
        let mut rendered: Vec<Vec<String>> = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(cell.render()?);
            }
            rendered.push(cells);
        }

        let mut widths: Vec<usize> = Vec::new();
        for row in &rendered {
            for (column, cell) in row.iter().enumerate() {
                if widths.len() <= column {
                    widths.push(0);
                }
                widths[column] = widths[column].max(cell.len());
            }
        }

        let rule = {
            let mut line = String::from(" +");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };

        let mut out = String::new();
        for (i, row) in rendered.iter().enumerate() {
            if i == 0 {
                out.push_str(&rule);
                out.push('\n');
            }
            out.push_str(" |");
            for (column, cell) in row.iter().enumerate() {
                out.push(' ');
                out.push_str(&format!("{:>width$}", cell, width = widths[column]));
                out.push_str(" |");
            }
            out.push('\n');
            if i == 0 || i == rendered.len() - 1 {
                out.push_str(&rule);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => write!(f, "{}", text),
            Err(_) => Err(fmt::Error),
        }
    }
}
