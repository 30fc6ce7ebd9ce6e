// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Pipeline configuration
//!
//! Defines the schema for lakeflow.yaml: entity list, schema descriptors,
//! paths, and the retry policy. Everything has a serde default so a bare
//! file (or `lakeflow init`) gets the five built-in e-commerce entities.
//! Configuration problems are fatal at startup and never retried.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::LakeflowError;
use crate::pipeline::RetryPolicy;
use crate::schema::{builtin_schemas, SchemaDescriptor};
use crate::transform::TransformerRegistry;

/// Pipeline definition from lakeflow.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Config version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Pipeline name
    #[serde(default = "default_name")]
    pub name: String,

    /// Directory holding one raw CSV per entity
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Directory receiving one columnar dataset per entity
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Object store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Retry/backoff/timeout policy applied to every task
    #[serde(default)]
    pub retry: RetryConfig,

    /// Entities to process, in declaration order
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,

    /// Schema descriptors keyed by entity; defaults cover the built-ins
    #[serde(default = "builtin_schemas")]
    pub schemas: HashMap<String, SchemaDescriptor>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: default_name(),
            raw_dir: default_raw_dir(),
            output_dir: default_output_dir(),
            storage: StorageConfig::default(),
            retry: RetryConfig::default(),
            entities: default_entities(),
            schemas: builtin_schemas(),
        }
    }
}

fn default_version() -> String {
    "1".to_string()
}

fn default_name() -> String {
    "ecommerce-analytics".to_string()
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_entities() -> Vec<String> {
    ["customers", "products", "orders", "order_items", "reviews"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Object store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the filesystem-backed store
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/lake")
}

/// Retry policy as declared in the pipeline file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per task, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Wall-clock budget per task attempt, in seconds
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_task_timeout_secs() -> u64 {
    300
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, LakeflowError> {
        if !path.exists() {
            return Err(LakeflowError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| LakeflowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, LakeflowError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, LakeflowError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Raw CSV path for one entity
    pub fn raw_path(&self, entity: &str) -> PathBuf {
        self.raw_dir.join(format!("{}.csv", entity))
    }

    /// The declared retry policy as runtime durations
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            task_timeout: Duration::from_secs(self.retry.task_timeout_secs),
        }
    }
}

/// Startup validation of a pipeline configuration
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration against the transformer registry.
    ///
    /// Errors make the run unstartable; warnings (such as absent raw files,
    /// which only fail the affected entity's tasks) are informational.
    pub fn validate(config: &PipelineConfig, registry: &TransformerRegistry) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.entities.is_empty() {
            result.add_error("Pipeline has no entities declared");
        }

        let mut seen = HashSet::new();
        for entity in &config.entities {
            if !seen.insert(entity) {
                result.add_error(&format!("Duplicate entity: '{}'", entity));
            }
            if !config.schemas.contains_key(entity) {
                result.add_error(&format!("No schema descriptor for entity '{}'", entity));
            }
            if !registry.contains(entity) {
                result.add_error(&format!("No transformer registered for entity '{}'", entity));
            }
            if !config.raw_path(entity).exists() {
                result.add_warning(&format!(
                    "Raw file not found for '{}': {}",
                    entity,
                    config.raw_path(entity).display()
                ));
            }
        }

        if config.retry.max_attempts == 0 {
            result.add_error("retry.max_attempts must be at least 1");
        }
        if config.retry.base_delay_ms == 0 {
            result.add_error("retry.base_delay_ms must be positive");
        }
        if config.retry.task_timeout_secs == 0 {
            result.add_error("retry.task_timeout_secs must be positive");
        }

        result
    }
}

/// Result of configuration validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
