// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Customers: trim names, normalize emails to lower case

use regex::Regex;
use std::sync::OnceLock;

use super::{CleanOutcome, EntityTransform};
use crate::table::{Table, Value};

static EMAIL_SHAPE: OnceLock<Regex> = OnceLock::new();

fn email_shape() -> &'static Regex {
    // loose shape check, not RFC validation
    EMAIL_SHAPE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

pub struct CustomersTransform;

impl EntityTransform for CustomersTransform {
    fn entity(&self) -> &'static str {
        "customers"
    }

    fn primary_key(&self) -> &'static [&'static str] {
        &["customer_id"]
    }

    fn clean(&self, table: &mut Table) -> CleanOutcome {
        let mut outcome = CleanOutcome::default();
        let name_idx = table.column_index("name");
        let email_idx = table.column_index("email");

        for row in table.rows.iter_mut() {
            if let Some(idx) = name_idx {
                if let Value::String(name) = &row[idx] {
                    row[idx] = Value::String(name.trim().to_string());
                }
            }
            if let Some(idx) = email_idx {
                if let Value::String(email) = &row[idx] {
                    let normalized = email.trim().to_lowercase();
                    if !email_shape().is_match(&normalized) {
                        outcome
                            .warnings
                            .push(format!("email '{}' does not look like an address", normalized));
                    }
                    row[idx] = Value::String(normalized);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ValueType};

    fn customers_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(
            "customers",
            vec![
                Column::new("customer_id", ValueType::String),
                Column::new("name", ValueType::String),
                Column::new("email", ValueType::String),
            ],
        );
        for (id, name, email) in rows {
            table.push_row(vec![
                Value::String(id.to_string()),
                Value::String(name.to_string()),
                Value::String(email.to_string()),
            ]);
        }
        table
    }

    #[test]
    fn test_email_normalized_lowercase_trimmed() {
        let mut table = customers_table(&[("c1", "  Jane Doe ", "  JANE@Example.COM ")]);
        CustomersTransform.clean(&mut table);

        assert_eq!(table.value(0, "name").unwrap().as_str(), Some("Jane Doe"));
        assert_eq!(
            table.value(0, "email").unwrap().as_str(),
            Some("jane@example.com")
        );
    }

    #[test]
    fn test_malformed_email_warns_but_keeps_row() {
        let mut table = customers_table(&[("c1", "Jane", "not-an-email")]);
        let outcome = CustomersTransform.clean(&mut table);

        assert_eq!(table.row_count(), 1);
        assert_eq!(outcome.rows_dropped, 0);
        assert_eq!(outcome.warnings.len(), 1);
    }
}
