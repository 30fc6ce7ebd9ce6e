// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Entity transformers
//!
//! One transformer per entity, all sharing the same skeleton: validate
//! against the schema, apply entity-specific cleaning, de-duplicate by
//! primary key (first occurrence wins), then enforce referential integrity
//! against the cleaned parent tables available in this run. The registry
//! keys transformers by entity name so orchestration never branches on
//! entities.

mod customers;
mod order_items;
mod orders;
mod products;
mod reviews;

pub use customers::CustomersTransform;
pub use order_items::OrderItemsTransform;
pub use orders::OrdersTransform;
pub use products::ProductsTransform;
pub use reviews::ReviewsTransform;

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::{LakeflowError, LakeflowResult};
use crate::schema::SchemaDescriptor;
use crate::table::{RawTable, Table};

/// A foreign-key reference from one entity column to a parent entity's key
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent: &'static str,
    pub parent_key: &'static str,
}

/// Rows and warnings produced by an entity's cleaning pass
#[derive(Debug, Default)]
pub struct CleanOutcome {
    /// Rows removed by cleaning rules (counted as schema rejections)
    pub rows_dropped: usize,
    pub warnings: Vec<String>,
}

/// Per-entity cleaning and key metadata
pub trait EntityTransform: Send + Sync {
    fn entity(&self) -> &'static str;

    /// Primary key columns (composite keys list more than one)
    fn primary_key(&self) -> &'static [&'static str];

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        &[]
    }

    /// Entity-specific cleaning: normalize strings, coerce numeric ranges,
    /// derive enrichment columns, drop rows that violate domain rules.
    fn clean(&self, table: &mut Table) -> CleanOutcome;
}

/// Structured per-entity transformation report
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransformReport {
    pub entity: String,
    pub rows_in: usize,
    pub rows_accepted: usize,
    pub rows_rejected_schema: usize,
    pub rows_dropped_dedup: usize,
    pub rows_dropped_fk: usize,
    pub warnings: Vec<String>,
}

/// Cleaned parent tables available in the current run, keyed by entity
pub type ParentTables = HashMap<String, Table>;

/// Run the shared transformation skeleton for one entity.
///
/// FK checks run against the cleaned, deduplicated parent tables. A parent
/// that is not part of this run (or did not survive it) downgrades the
/// check to a warning rather than an error.
pub fn run_transform(
    rules: &dyn EntityTransform,
    schema: &SchemaDescriptor,
    raw: &RawTable,
    parents: &ParentTables,
) -> LakeflowResult<(Table, TransformReport)> {
    let rows_in = raw.row_count();

    // 1. Schema validation: split accepted/rejected.
    let validated = schema.validate(raw)?;
    let mut table = validated.table;
    let mut rows_rejected_schema = validated.rejections.len();

    for rejection in &validated.rejections {
        tracing::debug!(
            entity = rules.entity(),
            row = rejection.row,
            "row rejected: {}",
            rejection.reason
        );
    }

    // 2. Entity-specific cleaning.
    let outcome = rules.clean(&mut table);
    rows_rejected_schema += outcome.rows_dropped;
    let mut warnings = outcome.warnings;

    // 3. De-duplicate by primary key, first occurrence wins.
    let key_indices: Vec<usize> = rules
        .primary_key()
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();
    let mut seen = HashSet::new();
    let mut keep = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        keep.push(seen.insert(table.key_of(row, &key_indices)));
    }
    let before = table.rows.len();
    let mut keep_iter = keep.into_iter();
    table.rows.retain(|_| keep_iter.next().unwrap_or(false));
    let rows_dropped_dedup = before - table.rows.len();

    // 4. Referential integrity against cleaned parents from the same run.
    let mut rows_dropped_fk = 0;
    for fk in rules.foreign_keys() {
        let Some(parent) = parents.get(fk.parent) else {
            warnings.push(format!(
                "parent table '{}' not available in this run; skipped FK check on '{}'",
                fk.parent, fk.column
            ));
            continue;
        };

        let Some(parent_key_idx) = parent.column_index(fk.parent_key) else {
            warnings.push(format!(
                "parent table '{}' has no column '{}'; skipped FK check on '{}'",
                fk.parent, fk.parent_key, fk.column
            ));
            continue;
        };
        let parent_keys: HashSet<String> = (0..parent.row_count())
            .map(|row| parent.rows[row][parent_key_idx].key_repr())
            .collect();

        let Some(fk_idx) = table.column_index(fk.column) else {
            continue;
        };
        let before = table.rows.len();
        table
            .rows
            .retain(|row| parent_keys.contains(&row[fk_idx].key_repr()));
        rows_dropped_fk += before - table.rows.len();
    }

    // 5. Partial success is the norm; zero survivors from a non-empty input
    //    means the entity is unprocessable.
    if rows_in > 0 && table.is_empty() {
        return Err(LakeflowError::EntityUnprocessable {
            entity: rules.entity().to_string(),
            rows_in,
        });
    }

    let report = TransformReport {
        entity: rules.entity().to_string(),
        rows_in,
        rows_accepted: table.row_count(),
        rows_rejected_schema,
        rows_dropped_dedup,
        rows_dropped_fk,
        warnings,
    };

    Ok((table, report))
}

/// Registry of entity transformers keyed by entity name
pub struct TransformerRegistry {
    transformers: HashMap<&'static str, Arc<dyn EntityTransform>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self {
            transformers: HashMap::new(),
        }
    }

    /// Registry with all five built-in e-commerce entities
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CustomersTransform));
        registry.register(Arc::new(ProductsTransform));
        registry.register(Arc::new(OrdersTransform));
        registry.register(Arc::new(OrderItemsTransform));
        registry.register(Arc::new(ReviewsTransform));
        registry
    }

    pub fn register(&mut self, transform: Arc<dyn EntityTransform>) {
        self.transformers.insert(transform.entity(), transform);
    }

    pub fn get(&self, entity: &str) -> Option<Arc<dyn EntityTransform>> {
        self.transformers.get(entity).cloned()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.transformers.contains_key(entity)
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
