// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! In-memory tabular data model
//!
//! Raw CSV input becomes a [`RawTable`] of untyped strings; the schema
//! validator turns it into a typed [`Table`]. Column order is preserved
//! end to end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{LakeflowError, LakeflowResult};

/// Fixed calendar format for all date parsing (timezone-naive)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared type of a column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Date,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// A single typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the value, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Stable string form used for key comparison (dedup, FK lookups)
    pub fn key_repr(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::String(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A typed, ordered table of records
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Entity name this table holds
    pub name: String,
    /// Columns in declared order
    pub columns: Vec<Column>,
    /// Row-major cell storage; every row has `columns.len()` cells
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Cell lookup by column name
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Append a derived column with one value per existing row
    pub fn add_column(&mut self, name: impl Into<String>, ty: ValueType, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(Column::new(name, ty));
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Composite key string for a row over the given column indices
    pub fn key_of(&self, row: usize, key_indices: &[usize]) -> String {
        let mut key = String::new();
        for (i, &idx) in key_indices.iter().enumerate() {
            if i > 0 {
                key.push('\u{1f}');
            }
            if let Some(v) = self.rows[row].get(idx) {
                key.push_str(&v.key_repr());
            }
        }
        key
    }
}

/// Untyped table straight from a CSV file
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            records: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read a UTF-8 CSV file with a header row into a [`RawTable`].
///
/// Header names are taken verbatim (case-sensitive match against schema
/// descriptors happens later). Short rows are padded with empty cells so
/// downstream code can index by header position.
pub fn read_csv(path: &Path, entity: &str) -> LakeflowResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| match e.kind() {
            csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                LakeflowError::raw_file_not_found(path.to_path_buf(), entity)
            }
            _ => LakeflowError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

    let headers = reader
        .headers()
        .map_err(|e| LakeflowError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut table = RawTable::new(entity, headers);

    for record in reader.records() {
        let record = record.map_err(|e| LakeflowError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        row.resize(table.headers.len(), String::new());
        table.records.push(row);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_csv_with_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "customer_id,name,email").unwrap();
        writeln!(file, "c1,Jane,jane@example.com").unwrap();
        writeln!(file, "c2,Omar,omar@example.com").unwrap();

        let raw = read_csv(file.path(), "customers").unwrap();
        assert_eq!(raw.headers, vec!["customer_id", "name", "email"]);
        assert_eq!(raw.row_count(), 2);
        assert_eq!(raw.records[1][1], "Omar");
    }

    #[test]
    fn test_read_csv_pads_short_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2").unwrap();

        let raw = read_csv(file.path(), "test").unwrap();
        assert_eq!(raw.records[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_read_csv_missing_file() {
        let err = read_csv(Path::new("/nonexistent/customers.csv"), "customers").unwrap_err();
        assert!(matches!(err, LakeflowError::FileNotFound { .. }));
    }

    #[test]
    fn test_table_cell_access() {
        let mut table = Table::new(
            "products",
            vec![
                Column::new("product_id", ValueType::String),
                Column::new("price", ValueType::Float),
            ],
        );
        table.push_row(vec![Value::String("p1".into()), Value::Float(9.5)]);

        assert_eq!(table.value(0, "product_id").unwrap().as_str(), Some("p1"));
        assert_eq!(table.value(0, "price").unwrap().as_float(), Some(9.5));
        assert!(table.value(0, "missing").is_none());
    }

    #[test]
    fn test_composite_key() {
        let mut table = Table::new(
            "order_items",
            vec![
                Column::new("order_id", ValueType::String),
                Column::new("product_id", ValueType::String),
            ],
        );
        table.push_row(vec![Value::String("o1".into()), Value::String("p1".into())]);
        table.push_row(vec![Value::String("o1".into()), Value::String("p2".into())]);

        let k0 = table.key_of(0, &[0, 1]);
        let k1 = table.key_of(1, &[0, 1]);
        assert_ne!(k0, k1);
    }

    #[test]
    fn test_add_derived_column() {
        let mut table = Table::new(
            "orders",
            vec![Column::new("order_id", ValueType::String)],
        );
        table.push_row(vec![Value::String("o1".into())]);
        table.add_column("order_year", ValueType::Integer, vec![Value::Integer(2024)]);

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.value(0, "order_year").unwrap().as_integer(), Some(2024));
    }

    #[test]
    fn test_integer_widens_to_float() {
        assert_eq!(Value::Integer(3).as_float(), Some(3.0));
    }
}
