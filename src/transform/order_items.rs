// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Order items: enforce positive quantities, derive per-line totals

use super::{CleanOutcome, EntityTransform, ForeignKey};
use crate::table::{Table, Value, ValueType};

pub struct OrderItemsTransform;

const ORDER_ITEMS_FKS: &[ForeignKey] = &[
    ForeignKey {
        column: "order_id",
        parent: "orders",
        parent_key: "order_id",
    },
    ForeignKey {
        column: "product_id",
        parent: "products",
        parent_key: "product_id",
    },
];

impl EntityTransform for OrderItemsTransform {
    fn entity(&self) -> &'static str {
        "order_items"
    }

    fn primary_key(&self) -> &'static [&'static str] {
        &["order_id", "product_id"]
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        ORDER_ITEMS_FKS
    }

    fn clean(&self, table: &mut Table) -> CleanOutcome {
        let mut outcome = CleanOutcome::default();
        let quantity_idx = table.column_index("quantity");
        let unit_price_idx = table.column_index("unit_price");

        // quantity > 0 enforced: zero or negative drops the row
        if let Some(idx) = quantity_idx {
            let before = table.rows.len();
            table
                .rows
                .retain(|row| matches!(row[idx].as_integer(), Some(q) if q > 0));
            outcome.rows_dropped = before - table.rows.len();
        }

        let mut totals = Vec::with_capacity(table.row_count());
        for row in &table.rows {
            let quantity = quantity_idx.and_then(|i| row[i].as_float());
            let unit_price = unit_price_idx.and_then(|i| row[i].as_float());
            totals.push(match (quantity, unit_price) {
                (Some(q), Some(p)) => Value::Float(q * p),
                _ => Value::Null,
            });
        }
        table.add_column("line_total", ValueType::Float, totals);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn items_table(rows: &[(&str, &str, i64, f64)]) -> Table {
        let mut table = Table::new(
            "order_items",
            vec![
                Column::new("order_id", ValueType::String),
                Column::new("product_id", ValueType::String),
                Column::new("quantity", ValueType::Integer),
                Column::new("unit_price", ValueType::Float),
            ],
        );
        for (order, product, quantity, price) in rows {
            table.push_row(vec![
                Value::String(order.to_string()),
                Value::String(product.to_string()),
                Value::Integer(*quantity),
                Value::Float(*price),
            ]);
        }
        table
    }

    #[test]
    fn test_zero_quantity_row_dropped() {
        let mut table = items_table(&[("o1", "p1", 0, 5.0), ("o1", "p2", 2, 5.0)]);
        let outcome = OrderItemsTransform.clean(&mut table);

        assert_eq!(outcome.rows_dropped, 1);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value(0, "product_id").unwrap().as_str(), Some("p2"));
    }

    #[test]
    fn test_negative_quantity_row_dropped() {
        let mut table = items_table(&[("o1", "p1", -3, 5.0)]);
        let outcome = OrderItemsTransform.clean(&mut table);
        assert_eq!(outcome.rows_dropped, 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_line_total_derived() {
        let mut table = items_table(&[("o1", "p1", 3, 4.5)]);
        OrderItemsTransform.clean(&mut table);

        assert_eq!(table.value(0, "line_total").unwrap().as_float(), Some(13.5));
    }

    #[test]
    fn test_composite_primary_key() {
        assert_eq!(
            OrderItemsTransform.primary_key(),
            &["order_id", "product_id"]
        );
    }
}
