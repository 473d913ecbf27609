//! Cell values flowing from payload parsing into bulk load.
//!
//! Parsing produces [`Cell::Null`] and [`Cell::Text`] only. The cleaning passes
//! turn text into typed cells according to the destination [`ColumnSpec`], and
//! the result is handed to a sink as a [`LoadBatch`].

use crate::schema::ColumnSpec;
use chrono::{DateTime, NaiveDate, Utc};

/// One value of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// SQL NULL (`\N` on the wire)
    Null,

    /// Raw or string-typed value
    Text(String),

    /// Boolean value
    Bool(bool),

    /// Any integer width; the column type decides the range
    Int(i64),

    /// Floating point value
    Float(f64),

    /// Calendar date
    Date(NaiveDate),

    /// Instant in UTC
    Timestamp(DateTime<Utc>),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// NULL or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// A cleaned chunk of one table, ready for bulk load.
///
/// Every row has exactly `columns.len()` cells, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBatch {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<Cell>>,
}

impl LoadBatch {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Values of one column across all rows.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;

    #[test]
    fn test_blank_cells() {
        assert!(Cell::Null.is_blank());
        assert!(Cell::text("").is_blank());
        assert!(!Cell::text(" ").is_blank());
        assert!(!Cell::Int(0).is_blank());
    }

    #[test]
    fn test_column_values() {
        let mut batch = LoadBatch::new(
            "party_party",
            vec![
                ColumnSpec::new("id", ColumnType::Int64),
                ColumnSpec::new("party_name", ColumnType::Text),
            ],
        );
        batch.rows.push(vec![Cell::Int(1), Cell::from("Green")]);
        batch.rows.push(vec![Cell::Int(2), Cell::Null]);

        assert_eq!(batch.column_names(), vec!["id", "party_name"]);
        assert_eq!(
            batch.column_values("party_name"),
            Some(vec![&Cell::text("Green"), &Cell::Null])
        );
        assert_eq!(batch.column_values("missing"), None);
    }
}
