// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Ingestion tasks
//!
//! An ingestion task reads one raw entity file and hands its bytes to the
//! storage capability under a deterministic key. Re-ingesting unchanged
//! content overwrites the same key, so repeated runs never accumulate
//! duplicate objects.

use std::path::PathBuf;

use crate::errors::{LakeflowError, LakeflowResult};
use crate::storage::{ObjectStore, PutOutcome};

/// Prefix for raw uploads in the object store
pub const RAW_KEY_PREFIX: &str = "raw-data";

/// One entity's raw-file upload
#[derive(Debug, Clone)]
pub struct IngestTask {
    pub entity: String,
    pub source: PathBuf,
}

impl IngestTask {
    pub fn new(entity: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            entity: entity.into(),
            source: source.into(),
        }
    }

    /// Deterministic destination key derived from the entity name
    pub fn object_key(entity: &str) -> String {
        format!("{}/{}.csv", RAW_KEY_PREFIX, entity)
    }

    /// Read the raw file and put it into the store.
    ///
    /// A missing or unreadable source file is a permanent failure; storage
    /// failures keep the class the store assigned them.
    pub async fn run(&self, store: &dyn ObjectStore) -> LakeflowResult<PutOutcome> {
        let bytes = tokio::fs::read(&self.source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LakeflowError::raw_file_not_found(self.source.clone(), &self.entity)
            } else {
                e.into()
            }
        })?;

        let key = Self::object_key(&self.entity);
        let outcome = store.put(&key, &bytes).await.map_err(|e| {
            let transient = e.class() == crate::errors::ErrorClass::Transient;
            LakeflowError::Storage {
                key: key.clone(),
                message: e.to_string(),
                transient,
            }
        })?;

        tracing::info!(entity = %self.entity, key = %key, bytes = bytes.len(), "raw file ingested");
        Ok(outcome)
    }
}
