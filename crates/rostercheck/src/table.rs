//! Caller-supplied tabular data.

use serde::{Deserialize, Serialize};

/// One dataset (roster, attendance log, ...) as an ordered sequence of rows
/// over named columns.
///
/// Tables arrive already loaded and column-normalized from the ingestion
/// layer; the engine never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordTable {
    /// Column headers, in dataset order.
    headers: Vec<String>,
    /// Row data as strings (row-major order).
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Create a new record table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Column headers in dataset order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value at (row, column name). `None` when the column does not
    /// exist; a row shorter than the header yields `""`.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .map(|r| r.get(idx).map(|s| s.as_str()).unwrap_or(""))
    }

    /// All values of a named column, one per row, in row order.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a str> + use<'a>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(idx).map(|s| s.as_str()).unwrap_or("")),
        )
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}
