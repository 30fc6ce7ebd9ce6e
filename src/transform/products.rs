// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Products: trim text fields, floor price at zero, derive a price tier

use super::{CleanOutcome, EntityTransform};
use crate::table::{Table, Value, ValueType};

pub struct ProductsTransform;

impl ProductsTransform {
    fn price_tier(price: f64) -> &'static str {
        match price {
            p if p < 50.0 => "budget",
            p if p < 150.0 => "mid-range",
            p if p < 500.0 => "premium",
            _ => "luxury",
        }
    }
}

impl EntityTransform for ProductsTransform {
    fn entity(&self) -> &'static str {
        "products"
    }

    fn primary_key(&self) -> &'static [&'static str] {
        &["product_id"]
    }

    fn clean(&self, table: &mut Table) -> CleanOutcome {
        let name_idx = table.column_index("name");
        let category_idx = table.column_index("category");
        let price_idx = table.column_index("price");

        let mut tiers = Vec::with_capacity(table.row_count());

        for row in table.rows.iter_mut() {
            for idx in [name_idx, category_idx].into_iter().flatten() {
                if let Value::String(text) = &row[idx] {
                    row[idx] = Value::String(text.trim().to_string());
                }
            }

            let mut tier = Value::Null;
            if let Some(idx) = price_idx {
                if let Some(price) = row[idx].as_float() {
                    let floored = price.max(0.0);
                    row[idx] = Value::Float(floored);
                    tier = Value::String(Self::price_tier(floored).to_string());
                }
            }
            tiers.push(tier);
        }

        table.add_column("price_tier", ValueType::String, tiers);

        CleanOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn products_table(rows: &[(&str, &str, &str, f64)]) -> Table {
        let mut table = Table::new(
            "products",
            vec![
                Column::new("product_id", ValueType::String),
                Column::new("name", ValueType::String),
                Column::new("category", ValueType::String),
                Column::new("price", ValueType::Float),
            ],
        );
        for (id, name, category, price) in rows {
            table.push_row(vec![
                Value::String(id.to_string()),
                Value::String(name.to_string()),
                Value::String(category.to_string()),
                Value::Float(*price),
            ]);
        }
        table
    }

    #[test]
    fn test_negative_price_floored_to_zero() {
        let mut table = products_table(&[("p1", "Widget", "tools", -4.99)]);
        ProductsTransform.clean(&mut table);

        assert_eq!(table.value(0, "price").unwrap().as_float(), Some(0.0));
    }

    #[test]
    fn test_price_tiers() {
        let mut table = products_table(&[
            ("p1", "A", "x", 10.0),
            ("p2", "B", "x", 99.0),
            ("p3", "C", "x", 300.0),
            ("p4", "D", "x", 1200.0),
        ]);
        ProductsTransform.clean(&mut table);

        let tiers: Vec<_> = (0..4)
            .map(|r| table.value(r, "price_tier").unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(tiers, vec!["budget", "mid-range", "premium", "luxury"]);
    }

    #[test]
    fn test_text_fields_trimmed() {
        let mut table = products_table(&[("p1", "  Widget ", " tools ", 5.0)]);
        ProductsTransform.clean(&mut table);

        assert_eq!(table.value(0, "name").unwrap().as_str(), Some("Widget"));
        assert_eq!(table.value(0, "category").unwrap().as_str(), Some("tools"));
    }
}
