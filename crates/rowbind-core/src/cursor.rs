//! Forward-only result cursors.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::row::Row;
use crate::value::Value;

/// A forward-only result cursor.
///
/// The cursor is owned and scoped by the caller; the mapper only advances
/// it and reads the current row.
pub trait Cursor {
    /// Move to the next row. Returns `false` once the cursor is exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Number of columns in the current result set.
    fn column_count(&self) -> usize;

    /// Name of the column at `index`.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Value at `index` in the current row.
    fn value(&self, index: usize) -> Result<Value>;

    /// Read a unique identifier at `index`.
    fn get_uuid(&self, index: usize) -> Result<[u8; 16]> {
        let value = self.value(index)?;
        value.as_uuid().ok_or_else(|| {
            let mut err = TypeError::new("uuid", value.type_name());
            if let Some(name) = self.column_name(index) {
                err = err.in_column(name);
            }
            Error::Type(err)
        })
    }
}

/// In-memory cursor over materialized rows.
#[derive(Debug, Clone, Default)]
pub struct RowCursor {
    rows: Vec<Row>,
    names: Vec<String>,
    position: Option<usize>,
}

impl RowCursor {
    /// Create a cursor over `rows`, positioned before the first row.
    ///
    /// Column names are taken from the first row.
    pub fn new(rows: Vec<Row>) -> Self {
        let names = rows
            .first()
            .map(|row| row.column_names().map(str::to_string).collect())
            .unwrap_or_default();
        Self {
            rows,
            names,
            position: None,
        }
    }

    /// Create a cursor with explicit column names, for results that may be empty.
    pub fn with_columns(names: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            rows,
            names,
            position: None,
        }
    }

    /// The row the cursor is positioned on.
    pub fn current(&self) -> Option<&Row> {
        self.position.and_then(|i| self.rows.get(i))
    }

    /// Number of rows still ahead of the cursor.
    pub fn remaining(&self) -> usize {
        match self.position {
            None => self.rows.len(),
            Some(i) => self.rows.len().saturating_sub(i + 1),
        }
    }
}

impl Cursor for RowCursor {
    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = Some(self.rows.len());
            Ok(false)
        }
    }

    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    fn value(&self, index: usize) -> Result<Value> {
        let row = self
            .current()
            .ok_or_else(|| Error::Custom("cursor is not positioned on a row".to_string()))?;
        row.get(index).cloned().ok_or_else(|| {
            Error::Type(TypeError::new(
                "column",
                format!("index {} out of bounds (row has {} columns)", index, row.len()),
            ))
        })
    }
}
