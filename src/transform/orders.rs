// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Orders: normalize status, derive year/month columns for seasonal analysis

use chrono::Datelike;

use super::{CleanOutcome, EntityTransform, ForeignKey};
use crate::table::{Table, Value, ValueType};

pub struct OrdersTransform;

const ORDERS_FKS: &[ForeignKey] = &[ForeignKey {
    column: "customer_id",
    parent: "customers",
    parent_key: "customer_id",
}];

impl EntityTransform for OrdersTransform {
    fn entity(&self) -> &'static str {
        "orders"
    }

    fn primary_key(&self) -> &'static [&'static str] {
        &["order_id"]
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        ORDERS_FKS
    }

    fn clean(&self, table: &mut Table) -> CleanOutcome {
        let status_idx = table.column_index("status");
        let date_idx = table.column_index("order_date");

        let mut years = Vec::with_capacity(table.row_count());
        let mut months = Vec::with_capacity(table.row_count());

        for row in table.rows.iter_mut() {
            if let Some(idx) = status_idx {
                if let Value::String(status) = &row[idx] {
                    row[idx] = Value::String(status.trim().to_lowercase());
                }
            }

            match date_idx.and_then(|idx| row[idx].as_date()) {
                Some(date) => {
                    years.push(Value::Integer(i64::from(date.year())));
                    months.push(Value::Integer(i64::from(date.month())));
                }
                None => {
                    years.push(Value::Null);
                    months.push(Value::Null);
                }
            }
        }

        table.add_column("order_year", ValueType::Integer, years);
        table.add_column("order_month", ValueType::Integer, months);

        CleanOutcome::default()
    }
}
