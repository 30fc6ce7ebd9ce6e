// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Reviews: clamp ratings into [1, 5], trim text, derive a rating label

use super::{CleanOutcome, EntityTransform, ForeignKey};
use crate::table::{Table, Value, ValueType};

pub struct ReviewsTransform;

const REVIEWS_FKS: &[ForeignKey] = &[ForeignKey {
    column: "product_id",
    parent: "products",
    parent_key: "product_id",
}];

impl ReviewsTransform {
    fn rating_label(rating: i64) -> &'static str {
        match rating {
            5 => "excellent",
            4 => "good",
            3 => "average",
            _ => "poor",
        }
    }
}

impl EntityTransform for ReviewsTransform {
    fn entity(&self) -> &'static str {
        "reviews"
    }

    fn primary_key(&self) -> &'static [&'static str] {
        &["review_id"]
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        REVIEWS_FKS
    }

    fn clean(&self, table: &mut Table) -> CleanOutcome {
        let rating_idx = table.column_index("rating");
        let text_idx = table.column_index("text");

        let mut labels = Vec::with_capacity(table.row_count());

        for row in table.rows.iter_mut() {
            if let Some(idx) = text_idx {
                if let Value::String(text) = &row[idx] {
                    row[idx] = Value::String(text.trim().to_string());
                }
            }

            let mut label = Value::Null;
            if let Some(idx) = rating_idx {
                if let Some(rating) = row[idx].as_integer() {
                    let clamped = rating.clamp(1, 5);
                    row[idx] = Value::Integer(clamped);
                    label = Value::String(Self::rating_label(clamped).to_string());
                }
            }
            labels.push(label);
        }

        table.add_column("rating_label", ValueType::String, labels);

        CleanOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn reviews_table(rows: &[(&str, &str, i64, &str)]) -> Table {
        let mut table = Table::new(
            "reviews",
            vec![
                Column::new("review_id", ValueType::String),
                Column::new("product_id", ValueType::String),
                Column::new("rating", ValueType::Integer),
                Column::new("text", ValueType::String),
            ],
        );
        for (id, product, rating, text) in rows {
            table.push_row(vec![
                Value::String(id.to_string()),
                Value::String(product.to_string()),
                Value::Integer(*rating),
                Value::String(text.to_string()),
            ]);
        }
        table
    }

    #[test]
    fn test_rating_clamped_at_boundaries() {
        let mut table = reviews_table(&[("r1", "p1", 0, "bad"), ("r2", "p1", 6, "great")]);
        ReviewsTransform.clean(&mut table);

        assert_eq!(table.value(0, "rating").unwrap().as_integer(), Some(1));
        assert_eq!(table.value(1, "rating").unwrap().as_integer(), Some(5));
    }

    #[test]
    fn test_rating_labels() {
        let mut table = reviews_table(&[
            ("r1", "p1", 5, ""),
            ("r2", "p1", 4, ""),
            ("r3", "p1", 3, ""),
            ("r4", "p1", 1, ""),
        ]);
        ReviewsTransform.clean(&mut table);

        let labels: Vec<_> = (0..4)
            .map(|r| table.value(r, "rating_label").unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(labels, vec!["excellent", "good", "average", "poor"]);
    }

    #[test]
    fn test_text_trimmed() {
        let mut table = reviews_table(&[("r1", "p1", 4, "  solid product  ")]);
        ReviewsTransform.clean(&mut table);
        assert_eq!(table.value(0, "text").unwrap().as_str(), Some("solid product"));
    }
}
