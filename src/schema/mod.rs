// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Schema descriptors and row-level validation
//!
//! A [`SchemaDescriptor`] declares the expected columns for one entity.
//! Validation splits a raw table into typed accepted rows and rejected
//! rows with reasons. A required column missing from the header is fatal
//! for the entity; a bad value in one row only rejects that row.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{LakeflowError, LakeflowResult};
use crate::table::{Column, RawTable, Table, Value, ValueType, DATE_FORMAT};

/// Declared expectations for one column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    #[serde(default)]
    pub required: bool,
    /// Raw-string default applied when the cell is empty or the column absent
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnSpec {
    pub fn required(name: &str, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Ordered column expectations for one entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDescriptor {
    pub entity: String,
    pub columns: Vec<ColumnSpec>,
}

/// One rejected input row and why
#[derive(Debug, Clone, Serialize)]
pub struct RowRejection {
    /// Zero-based row index in the raw table
    pub row: usize,
    pub reason: String,
}

/// Outcome of validating a raw table against a schema
#[derive(Debug)]
pub struct Validated {
    pub table: Table,
    pub rejections: Vec<RowRejection>,
}

impl SchemaDescriptor {
    pub fn new(entity: &str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            entity: entity.into(),
            columns,
        }
    }

    /// Validate and type a raw table.
    ///
    /// Returns the accepted rows as a typed [`Table`] (declared column order,
    /// undeclared input columns dropped) plus the per-row rejection list.
    pub fn validate(&self, raw: &RawTable) -> LakeflowResult<Validated> {
        // Whole-entity check first: a required column absent from the header
        // makes the entity unprocessable.
        for spec in &self.columns {
            if spec.required && raw.header_index(&spec.name).is_none() {
                return Err(LakeflowError::MissingRequiredColumn {
                    entity: self.entity.clone(),
                    column: spec.name.clone(),
                });
            }
        }

        let source_indices: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|spec| raw.header_index(&spec.name))
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|spec| Column::new(spec.name.clone(), spec.ty))
            .collect();
        let mut table = Table::new(raw.name.clone(), columns);
        let mut rejections = Vec::new();

        'rows: for (row_idx, record) in raw.records.iter().enumerate() {
            let mut typed = Vec::with_capacity(self.columns.len());

            for (spec, source) in self.columns.iter().zip(&source_indices) {
                let cell = source
                    .and_then(|i| record.get(i))
                    .map(|s| s.as_str())
                    .unwrap_or("");

                match coerce_cell(cell, spec) {
                    Ok(value) => typed.push(value),
                    Err(reason) => {
                        rejections.push(RowRejection {
                            row: row_idx,
                            reason: format!("column '{}': {}", spec.name, reason),
                        });
                        continue 'rows;
                    }
                }
            }

            table.push_row(typed);
        }

        Ok(Validated { table, rejections })
    }
}

/// Coerce a raw cell into the declared type.
///
/// Empty cells fall back to the column default, then to null (or rejection
/// when the column is required). Coercion attempts run in a fixed order:
/// exact type parse, safe numeric widening (integer text into a float
/// column), then the single fixed date format for date columns.
fn coerce_cell(cell: &str, spec: &ColumnSpec) -> Result<Value, String> {
    let trimmed = cell.trim();

    if trimmed.is_empty() {
        if let Some(default) = &spec.default {
            return coerce_value(default, spec.ty);
        }
        if spec.required {
            return Err("missing required value".into());
        }
        return Ok(Value::Null);
    }

    coerce_value(trimmed, spec.ty)
}

fn coerce_value(text: &str, ty: ValueType) -> Result<Value, String> {
    match ty {
        ValueType::String => Ok(Value::String(text.to_string())),
        ValueType::Integer => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("'{}' is not an integer", text)),
        ValueType::Float => {
            if let Ok(x) = text.parse::<f64>() {
                if x.is_finite() {
                    return Ok(Value::Float(x));
                }
            }
            // widening: integer text is a valid float
            text.parse::<i64>()
                .map(|n| Value::Float(n as f64))
                .map_err(|_| format!("'{}' is not a number", text))
        }
        ValueType::Date => chrono::NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| format!("'{}' does not match date format {}", text, DATE_FORMAT)),
    }
}

/// Built-in schema descriptors for the five e-commerce entities
pub fn builtin_schemas() -> HashMap<String, SchemaDescriptor> {
    let mut schemas = HashMap::new();

    schemas.insert(
        "customers".to_string(),
        SchemaDescriptor::new(
            "customers",
            vec![
                ColumnSpec::required("customer_id", ValueType::String),
                ColumnSpec::required("name", ValueType::String),
                ColumnSpec::required("email", ValueType::String),
                ColumnSpec::required("signup_date", ValueType::Date),
            ],
        ),
    );

    schemas.insert(
        "products".to_string(),
        SchemaDescriptor::new(
            "products",
            vec![
                ColumnSpec::required("product_id", ValueType::String),
                ColumnSpec::required("name", ValueType::String),
                ColumnSpec::required("category", ValueType::String),
                ColumnSpec::required("price", ValueType::Float),
            ],
        ),
    );

    schemas.insert(
        "orders".to_string(),
        SchemaDescriptor::new(
            "orders",
            vec![
                ColumnSpec::required("order_id", ValueType::String),
                ColumnSpec::required("customer_id", ValueType::String),
                ColumnSpec::required("order_date", ValueType::Date),
                ColumnSpec::required("status", ValueType::String).with_default("pending"),
                ColumnSpec::optional("total_amount", ValueType::Float),
            ],
        ),
    );

    schemas.insert(
        "order_items".to_string(),
        SchemaDescriptor::new(
            "order_items",
            vec![
                ColumnSpec::required("order_id", ValueType::String),
                ColumnSpec::required("product_id", ValueType::String),
                ColumnSpec::required("quantity", ValueType::Integer),
                ColumnSpec::required("unit_price", ValueType::Float),
            ],
        ),
    );

    schemas.insert(
        "reviews".to_string(),
        SchemaDescriptor::new(
            "reviews",
            vec![
                ColumnSpec::required("review_id", ValueType::String),
                ColumnSpec::required("product_id", ValueType::String),
                ColumnSpec::required("rating", ValueType::Integer),
                ColumnSpec::optional("text", ValueType::String),
                ColumnSpec::optional("review_date", ValueType::Date),
            ],
        ),
    );

    schemas
}
