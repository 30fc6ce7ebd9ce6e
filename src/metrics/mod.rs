// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Business metrics over cleaned tables
//!
//! Aggregates the cleaned entity tables of a run into small analytics
//! datasets: customer lifetime value, product performance, and monthly
//! sales trends. Metrics are derived data; a missing input table skips
//! the affected metric with a warning instead of failing the run.

use std::collections::BTreeMap;

use crate::table::{Column, Table, Value, ValueType};
use crate::transform::ParentTables;

/// Object-store key prefix for published metric datasets
pub const METRICS_KEY_PREFIX: &str = "metrics";

/// Build every metric the available tables support.
///
/// Returns the metric tables plus a warning per metric that had to be
/// skipped because its input table is not present.
pub fn business_metrics(tables: &ParentTables) -> (Vec<Table>, Vec<String>) {
    let mut metrics = Vec::new();
    let mut warnings = Vec::new();

    match tables.get("orders") {
        Some(orders) => {
            metrics.push(customer_lifetime_value(orders));
            metrics.push(monthly_sales(orders));
        }
        None => warnings.push(
            "orders table unavailable; skipping customer_lifetime_value and monthly_sales".into(),
        ),
    }

    match tables.get("order_items") {
        Some(items) => metrics.push(product_performance(items, tables.get("reviews"))),
        None => {
            warnings.push("order_items table unavailable; skipping product_performance".into())
        }
    }

    (metrics, warnings)
}

/// Per-customer order count and total spend, sorted by customer id
pub fn customer_lifetime_value(orders: &Table) -> Table {
    let customer_idx = orders.column_index("customer_id");
    let amount_idx = orders.column_index("total_amount");

    let mut groups: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for row in &orders.rows {
        let Some(customer) = customer_idx.and_then(|i| row[i].as_str()) else {
            continue;
        };
        let amount = amount_idx.and_then(|i| row[i].as_float()).unwrap_or(0.0);
        let entry = groups.entry(customer.to_string()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += amount;
    }

    let mut table = Table::new(
        "customer_lifetime_value",
        vec![
            Column::new("customer_id", ValueType::String),
            Column::new("order_count", ValueType::Integer),
            Column::new("lifetime_value", ValueType::Float),
        ],
    );
    for (customer, (count, total)) in groups {
        table.push_row(vec![
            Value::String(customer),
            Value::Integer(count),
            Value::Float(total),
        ]);
    }
    table
}

/// Per-product units sold and revenue, joined with review stats when the
/// reviews table is available
pub fn product_performance(order_items: &Table, reviews: Option<&Table>) -> Table {
    let product_idx = order_items.column_index("product_id");
    let quantity_idx = order_items.column_index("quantity");
    let total_idx = order_items.column_index("line_total");

    let mut groups: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for row in &order_items.rows {
        let Some(product) = product_idx.and_then(|i| row[i].as_str()) else {
            continue;
        };
        let units = quantity_idx.and_then(|i| row[i].as_integer()).unwrap_or(0);
        let revenue = total_idx.and_then(|i| row[i].as_float()).unwrap_or(0.0);
        let entry = groups.entry(product.to_string()).or_insert((0, 0.0));
        entry.0 += units;
        entry.1 += revenue;
    }

    // (review count, rating sum) per product
    let mut ratings: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    if let Some(reviews) = reviews {
        let product_idx = reviews.column_index("product_id");
        let rating_idx = reviews.column_index("rating");
        for row in &reviews.rows {
            let Some(product) = product_idx.and_then(|i| row[i].as_str()) else {
                continue;
            };
            let Some(rating) = rating_idx.and_then(|i| row[i].as_float()) else {
                continue;
            };
            let entry = ratings.entry(product.to_string()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += rating;
        }
    }

    let mut table = Table::new(
        "product_performance",
        vec![
            Column::new("product_id", ValueType::String),
            Column::new("units_sold", ValueType::Integer),
            Column::new("revenue", ValueType::Float),
            Column::new("review_count", ValueType::Integer),
            Column::new("avg_rating", ValueType::Float),
        ],
    );
    for (product, (units, revenue)) in groups {
        let (review_count, avg_rating) = match ratings.get(&product) {
            Some((count, sum)) if *count > 0 => {
                (Value::Integer(*count), Value::Float(sum / *count as f64))
            }
            _ => (Value::Integer(0), Value::Null),
        };
        table.push_row(vec![
            Value::String(product),
            Value::Integer(units),
            Value::Float(revenue),
            review_count,
            avg_rating,
        ]);
    }
    table
}

/// Order count and revenue grouped by order year and month
pub fn monthly_sales(orders: &Table) -> Table {
    let year_idx = orders.column_index("order_year");
    let month_idx = orders.column_index("order_month");
    let amount_idx = orders.column_index("total_amount");

    let mut groups: BTreeMap<(i64, i64), (i64, f64)> = BTreeMap::new();
    for row in &orders.rows {
        let year = year_idx.and_then(|i| row[i].as_integer());
        let month = month_idx.and_then(|i| row[i].as_integer());
        // rows without a parsed order date carry no year/month
        let (Some(year), Some(month)) = (year, month) else {
            continue;
        };
        let amount = amount_idx.and_then(|i| row[i].as_float()).unwrap_or(0.0);
        let entry = groups.entry((year, month)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += amount;
    }

    let mut table = Table::new(
        "monthly_sales",
        vec![
            Column::new("order_year", ValueType::Integer),
            Column::new("order_month", ValueType::Integer),
            Column::new("order_count", ValueType::Integer),
            Column::new("revenue", ValueType::Float),
        ],
    );
    for ((year, month), (count, revenue)) in groups {
        table.push_row(vec![
            Value::Integer(year),
            Value::Integer(month),
            Value::Integer(count),
            Value::Float(revenue),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_table() -> Table {
        let mut table = Table::new(
            "orders",
            vec![
                Column::new("order_id", ValueType::String),
                Column::new("customer_id", ValueType::String),
                Column::new("total_amount", ValueType::Float),
                Column::new("order_year", ValueType::Integer),
                Column::new("order_month", ValueType::Integer),
            ],
        );
        table.push_row(vec![
            Value::String("o1".into()),
            Value::String("c1".into()),
            Value::Float(70.0),
            Value::Integer(2024),
            Value::Integer(3),
        ]);
        table.push_row(vec![
            Value::String("o2".into()),
            Value::String("c1".into()),
            Value::Float(30.0),
            Value::Integer(2024),
            Value::Integer(4),
        ]);
        table.push_row(vec![
            Value::String("o3".into()),
            Value::String("c2".into()),
            Value::Float(1200.0),
            Value::Integer(2024),
            Value::Integer(3),
        ]);
        table
    }

    fn order_items_table() -> Table {
        let mut table = Table::new(
            "order_items",
            vec![
                Column::new("order_id", ValueType::String),
                Column::new("product_id", ValueType::String),
                Column::new("quantity", ValueType::Integer),
                Column::new("line_total", ValueType::Float),
            ],
        );
        table.push_row(vec![
            Value::String("o1".into()),
            Value::String("p1".into()),
            Value::Integer(2),
            Value::Float(70.0),
        ]);
        table.push_row(vec![
            Value::String("o3".into()),
            Value::String("p2".into()),
            Value::Integer(1),
            Value::Float(1200.0),
        ]);
        table.push_row(vec![
            Value::String("o2".into()),
            Value::String("p1".into()),
            Value::Integer(1),
            Value::Float(35.0),
        ]);
        table
    }

    fn reviews_table() -> Table {
        let mut table = Table::new(
            "reviews",
            vec![
                Column::new("review_id", ValueType::String),
                Column::new("product_id", ValueType::String),
                Column::new("rating", ValueType::Integer),
            ],
        );
        table.push_row(vec![
            Value::String("r1".into()),
            Value::String("p1".into()),
            Value::Integer(5),
        ]);
        table.push_row(vec![
            Value::String("r2".into()),
            Value::String("p1".into()),
            Value::Integer(4),
        ]);
        table
    }

    #[test]
    fn test_customer_lifetime_value_aggregates_per_customer() {
        let metric = customer_lifetime_value(&orders_table());

        assert_eq!(metric.row_count(), 2);
        assert_eq!(metric.value(0, "customer_id").unwrap().as_str(), Some("c1"));
        assert_eq!(metric.value(0, "order_count").unwrap().as_integer(), Some(2));
        assert_eq!(metric.value(0, "lifetime_value").unwrap().as_float(), Some(100.0));
        assert_eq!(metric.value(1, "customer_id").unwrap().as_str(), Some("c2"));
        assert_eq!(metric.value(1, "lifetime_value").unwrap().as_float(), Some(1200.0));
    }

    #[test]
    fn test_monthly_sales_groups_by_year_and_month() {
        let metric = monthly_sales(&orders_table());

        assert_eq!(metric.row_count(), 2);
        // 2024-03 holds o1 and o3
        assert_eq!(metric.value(0, "order_month").unwrap().as_integer(), Some(3));
        assert_eq!(metric.value(0, "order_count").unwrap().as_integer(), Some(2));
        assert_eq!(metric.value(0, "revenue").unwrap().as_float(), Some(1270.0));
        assert_eq!(metric.value(1, "order_month").unwrap().as_integer(), Some(4));
        assert_eq!(metric.value(1, "order_count").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn test_monthly_sales_skips_rows_without_dates() {
        let mut orders = orders_table();
        orders.rows[0][3] = Value::Null;
        orders.rows[0][4] = Value::Null;

        let metric = monthly_sales(&orders);
        let total: i64 = metric
            .rows
            .iter()
            .map(|r| r[2].as_integer().unwrap())
            .sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_product_performance_joins_review_stats() {
        let reviews = reviews_table();
        let metric = product_performance(&order_items_table(), Some(&reviews));

        assert_eq!(metric.row_count(), 2);
        assert_eq!(metric.value(0, "product_id").unwrap().as_str(), Some("p1"));
        assert_eq!(metric.value(0, "units_sold").unwrap().as_integer(), Some(3));
        assert_eq!(metric.value(0, "revenue").unwrap().as_float(), Some(105.0));
        assert_eq!(metric.value(0, "review_count").unwrap().as_integer(), Some(2));
        assert_eq!(metric.value(0, "avg_rating").unwrap().as_float(), Some(4.5));
        // p2 has no reviews
        assert_eq!(metric.value(1, "review_count").unwrap().as_integer(), Some(0));
        assert!(metric.value(1, "avg_rating").unwrap().is_null());
    }

    #[test]
    fn test_product_performance_without_reviews_table() {
        let metric = product_performance(&order_items_table(), None);

        assert_eq!(metric.row_count(), 2);
        assert_eq!(metric.value(0, "review_count").unwrap().as_integer(), Some(0));
        assert!(metric.value(0, "avg_rating").unwrap().is_null());
    }

    #[test]
    fn test_business_metrics_warns_on_missing_inputs() {
        let mut tables = ParentTables::new();
        tables.insert("order_items".into(), order_items_table());

        let (metrics, warnings) = business_metrics(&tables);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "product_performance");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("orders"));
    }

    #[test]
    fn test_business_metrics_full_set() {
        let mut tables = ParentTables::new();
        tables.insert("orders".into(), orders_table());
        tables.insert("order_items".into(), order_items_table());
        tables.insert("reviews".into(), reviews_table());

        let (metrics, warnings) = business_metrics(&tables);

        let names: Vec<_> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["customer_lifetime_value", "monthly_sales", "product_performance"]
        );
        assert!(warnings.is_empty());
    }
}
