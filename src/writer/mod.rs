// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Columnar dataset writer
//!
//! Serializes a cleaned table into a column-oriented JSON document that
//! preserves column order and declared types. Writes go to a temp file in
//! the destination directory and are renamed into place, so a reader never
//! observes a partially written dataset. Each run overwrites the previous
//! dataset for the entity.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{LakeflowError, LakeflowResult};
use crate::table::{Column, Table, Value, ValueType, DATE_FORMAT};

#[derive(Debug, Serialize, Deserialize)]
struct ColumnDoc {
    name: String,
    #[serde(rename = "type")]
    ty: ValueType,
    values: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DatasetDoc {
    name: String,
    row_count: usize,
    columns: Vec<ColumnDoc>,
}

/// Prefix for published datasets in the object store
pub const PROCESSED_KEY_PREFIX: &str = "processed";

/// Object-store key for an entity's published dataset
pub fn dataset_key(entity: &str) -> String {
    format!("{}/{}.json", PROCESSED_KEY_PREFIX, entity)
}

/// Writes cleaned tables to a configured output directory
#[derive(Debug)]
pub struct DatasetWriter {
    output_dir: PathBuf,
}

impl DatasetWriter {
    /// Create a writer; the output directory is created if absent
    pub fn new(output_dir: impl Into<PathBuf>) -> LakeflowResult<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|e| LakeflowError::FileWriteError {
            path: output_dir.clone(),
            error: e.to_string(),
        })?;
        Ok(Self { output_dir })
    }

    /// Destination path for an entity's dataset
    pub fn dataset_path(&self, destination: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", destination))
    }

    /// Serialize and atomically write a table, overwriting any prior dataset
    pub fn write(&self, table: &Table, destination: &str) -> LakeflowResult<PathBuf> {
        let path = self.dataset_path(destination);
        let doc = to_doc(table);
        let json = serde_json::to_vec_pretty(&doc)?;

        // temp file in the same directory so the rename is atomic
        let mut temp = tempfile::NamedTempFile::new_in(&self.output_dir).map_err(|e| {
            LakeflowError::FileWriteError {
                path: path.clone(),
                error: e.to_string(),
            }
        })?;
        temp.write_all(&json)
            .and_then(|_| temp.flush())
            .map_err(|e| LakeflowError::FileWriteError {
                path: path.clone(),
                error: e.to_string(),
            })?;
        temp.persist(&path).map_err(|e| LakeflowError::FileWriteError {
            path: path.clone(),
            error: e.to_string(),
        })?;

        tracing::debug!(dataset = destination, rows = table.row_count(), "dataset written");
        Ok(path)
    }

    /// Read a dataset back into a typed table
    pub fn read(&self, destination: &str) -> LakeflowResult<Table> {
        read_dataset(&self.dataset_path(destination))
    }
}

fn to_doc(table: &Table) -> DatasetDoc {
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| ColumnDoc {
            name: column.name.clone(),
            ty: column.ty,
            values: table.rows.iter().map(|row| to_json(&row[idx])).collect(),
        })
        .collect();

    DatasetDoc {
        name: table.name.clone(),
        row_count: table.row_count(),
        columns,
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(x) => serde_json::Value::from(*x),
        Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
    }
}

fn from_json(value: &serde_json::Value, ty: ValueType) -> LakeflowResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let parsed = match ty {
        ValueType::String => value.as_str().map(|s| Value::String(s.to_string())),
        ValueType::Integer => value.as_i64().map(Value::Integer),
        ValueType::Float => value.as_f64().map(Value::Float),
        ValueType::Date => value
            .as_str()
            .and_then(|s| chrono::NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map(Value::Date),
    };
    parsed.ok_or_else(|| LakeflowError::Json {
        message: format!("value {} is not a valid {}", value, ty),
    })
}

/// Read a columnar dataset file into a [`Table`]
pub fn read_dataset(path: &Path) -> LakeflowResult<Table> {
    let content = std::fs::read_to_string(path).map_err(|e| LakeflowError::FileReadError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    let doc: DatasetDoc = serde_json::from_str(&content)?;

    let columns: Vec<Column> = doc
        .columns
        .iter()
        .map(|c| Column::new(c.name.clone(), c.ty))
        .collect();
    let mut table = Table::new(doc.name, columns);

    for row_idx in 0..doc.row_count {
        let mut row = Vec::with_capacity(doc.columns.len());
        for column in &doc.columns {
            let cell = column.values.get(row_idx).unwrap_or(&serde_json::Value::Null);
            row.push(from_json(cell, column.ty)?);
        }
        table.push_row(row);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_table() -> Table {
        let mut table = Table::new(
            "orders",
            vec![
                Column::new("order_id", ValueType::String),
                Column::new("order_date", ValueType::Date),
                Column::new("total_amount", ValueType::Float),
                Column::new("order_year", ValueType::Integer),
            ],
        );
        table.push_row(vec![
            Value::String("o1".into()),
            Value::Date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
            Value::Float(42.5),
            Value::Integer(2024),
        ]);
        table.push_row(vec![
            Value::String("o2".into()),
            Value::Null,
            Value::Null,
            Value::Null,
        ]);
        table
    }

    #[test]
    fn test_round_trip_preserves_values_and_types() {
        let dir = TempDir::new().unwrap();
        let writer = DatasetWriter::new(dir.path()).unwrap();

        let table = sample_table();
        writer.write(&table, "orders").unwrap();
        let restored = writer.read("orders").unwrap();

        assert_eq!(restored, table);
    }

    #[test]
    fn test_overwrite_replaces_previous_dataset() {
        let dir = TempDir::new().unwrap();
        let writer = DatasetWriter::new(dir.path()).unwrap();

        let mut first = sample_table();
        writer.write(&first, "orders").unwrap();

        first.rows.truncate(1);
        writer.write(&first, "orders").unwrap();

        let restored = writer.read("orders").unwrap();
        assert_eq!(restored.row_count(), 1);
    }

    #[test]
    fn test_no_stray_temp_files_after_write() {
        let dir = TempDir::new().unwrap();
        let writer = DatasetWriter::new(dir.path()).unwrap();
        writer.write(&sample_table(), "orders").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["orders.json"]);
    }

    #[test]
    fn test_unwritable_destination_errors() {
        let err = DatasetWriter::new("/proc/lakeflow-definitely-not-writable").unwrap_err();
        assert!(matches!(err, LakeflowError::FileWriteError { .. }));
    }

    #[test]
    fn test_column_order_preserved() {
        let dir = TempDir::new().unwrap();
        let writer = DatasetWriter::new(dir.path()).unwrap();
        writer.write(&sample_table(), "orders").unwrap();

        let restored = writer.read("orders").unwrap();
        let names: Vec<_> = restored.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["order_id", "order_date", "total_amount", "order_year"]);
    }
}
