// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Object storage capability
//!
//! The pipeline only needs "durably store a named byte blob". The trait
//! keeps that seam narrow; [`FsObjectStore`] backs it with a local
//! directory tree, using blake3 content hashes so re-putting unchanged
//! bytes is observable as a no-op.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::errors::ErrorClass;

/// Storage failure, pre-classified for the retry policy
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("transient storage failure: {message}")]
    Transient { message: String },

    #[error("permanent storage failure: {message}")]
    Permanent { message: String },
}

impl StorageError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transient { .. } => ErrorClass::Transient,
            Self::Permanent { .. } => ErrorClass::Permanent,
        }
    }

    fn from_io(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::InvalidInput => {
                Self::Permanent {
                    message: e.to_string(),
                }
            }
            _ => Self::Transient {
                message: e.to_string(),
            },
        }
    }
}

/// Result of a successful put
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// Bytes were written (new object or changed content)
    Stored { bytes: u64, checksum: String },
    /// Content hash matched the existing object; nothing rewritten
    Unchanged { checksum: String },
}

impl PutOutcome {
    pub fn checksum(&self) -> &str {
        match self {
            Self::Stored { checksum, .. } | Self::Unchanged { checksum } => checksum,
        }
    }
}

/// Durable named-blob storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, overwriting any existing object
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<PutOutcome, StorageError>;

    /// Fetch an object's bytes
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Filesystem-backed object store rooted at a local directory
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<PutOutcome, StorageError> {
        let path = self.object_path(key);
        let checksum = blake3::hash(bytes).to_hex().to_string();

        // idempotent re-put: identical content leaves the object untouched
        if let Ok(existing) = tokio::fs::read(&path).await {
            if blake3::hash(&existing).to_hex().to_string() == checksum {
                tracing::debug!(key, "object unchanged, skipping write");
                return Ok(PutOutcome::Unchanged { checksum });
            }
        }

        let parent = path.parent().ok_or_else(|| StorageError::Permanent {
            message: format!("invalid object key '{}'", key),
        })?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(StorageError::from_io)?;

        // write-to-temp-then-rename within the destination directory
        let temp = tempfile::NamedTempFile::new_in(parent).map_err(StorageError::from_io)?;
        std::fs::write(temp.path(), bytes).map_err(StorageError::from_io)?;
        temp.persist(&path)
            .map_err(|e| StorageError::from_io(e.error))?;

        tracing::debug!(key, bytes = bytes.len(), %checksum, "object stored");
        Ok(PutOutcome::Stored {
            bytes: bytes.len() as u64,
            checksum,
        })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key);
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::Permanent {
                message: format!("object '{}' not found", key),
            },
            _ => StorageError::from_io(e),
        })
    }
}
