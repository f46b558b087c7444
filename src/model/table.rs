//! Table types.

use serde::{Deserialize, Serialize};

/// A table recovered from aligned text.
///
/// Every row has the same number of cells; short rows are padded with
/// empty cells on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table, right-padding short rows with empty cells.
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(columns, String::new());
        }
        Self { rows }
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.column_count() == 0
    }

    /// The first row, used as column headers by the Markdown renderer.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}
