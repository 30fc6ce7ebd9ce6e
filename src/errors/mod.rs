// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Error types for the pipeline
//!
//! Every failure carries enough context to print a human-readable reason in
//! the run summary, and classifies itself as transient or permanent so the
//! task runner can decide whether a retry is worth attempting.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for lakeflow operations
pub type LakeflowResult<T> = Result<T, LakeflowError>;

/// Whether a failure is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to resolve on retry (network blip, lock contention, timeout)
    Transient,
    /// Retrying cannot fix it (missing file, bad schema, bad config)
    Permanent,
}

/// Main error type for lakeflow
#[derive(Error, Debug, Diagnostic)]
pub enum LakeflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline file not found: {path}")]
    #[diagnostic(
        code(lakeflow::config_not_found),
        help("Create a pipeline with 'lakeflow init' or create lakeflow.yaml manually")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid pipeline configuration: {reason}")]
    #[diagnostic(code(lakeflow::invalid_config))]
    InvalidConfig {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("No schema descriptor for entity '{entity}'")]
    #[diagnostic(
        code(lakeflow::unknown_entity),
        help("Declare a schema for '{entity}' under 'schemas:' or remove it from 'entities:'")
    )]
    UnknownEntity { entity: String },

    #[error("Malformed retry policy: {reason}")]
    #[diagnostic(code(lakeflow::invalid_retry_policy))]
    InvalidRetryPolicy { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Schema Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Entity '{entity}': required column '{column}' is missing from the input header")]
    #[diagnostic(
        code(lakeflow::missing_required_column),
        help("The raw file's header row must name every required column exactly (case-sensitive)")
    )]
    MissingRequiredColumn { entity: String, column: String },

    #[error("Entity '{entity}' is unprocessable: none of {rows_in} input rows survived transformation")]
    #[diagnostic(code(lakeflow::entity_unprocessable))]
    EntityUnprocessable { entity: String, rows_in: usize },

    // ─────────────────────────────────────────────────────────────────────────
    // Task Graph Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Circular dependency detected")]
    #[diagnostic(
        code(lakeflow::circular_dependency),
        help("Review the task dependencies to remove the cycle")
    )]
    CircularDependency { tasks: Vec<String> },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    #[diagnostic(code(lakeflow::unknown_dependency))]
    UnknownDependency { task: String, dependency: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Task '{task}' exceeded its {timeout_secs}s wall-clock budget")]
    #[diagnostic(code(lakeflow::task_timeout))]
    TaskTimeout { task: String, timeout_secs: u64 },

    #[error("Task '{task}' failed: {reason}")]
    #[diagnostic(code(lakeflow::task_failed))]
    TaskFailed { task: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Storage error for key '{key}': {message}")]
    #[diagnostic(code(lakeflow::storage_error))]
    Storage {
        key: String,
        message: String,
        transient: bool,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("File not found: {path}")]
    #[diagnostic(code(lakeflow::file_not_found))]
    FileNotFound {
        path: PathBuf,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(lakeflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(lakeflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Parsing Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(lakeflow::io_error))]
    Io {
        message: String,
        kind: std::io::ErrorKind,
    },

    #[error("CSV error in '{path}': {message}")]
    #[diagnostic(code(lakeflow::csv_error))]
    Csv { path: PathBuf, message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(lakeflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(lakeflow::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for LakeflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
            kind: e.kind(),
        }
    }
}

impl From<serde_yaml::Error> for LakeflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for LakeflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl LakeflowError {
    /// Classify this error for the retry policy.
    ///
    /// Timeouts and unclassified I/O failures (lock contention, interrupted
    /// syscalls) are transient. Missing files, permission problems, schema
    /// and configuration errors are permanent.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::TaskTimeout { .. } => ErrorClass::Transient,
            Self::Storage { transient, .. } => {
                if *transient {
                    ErrorClass::Transient
                } else {
                    ErrorClass::Permanent
                }
            }
            Self::Io { kind, .. } => match kind {
                std::io::ErrorKind::NotFound
                | std::io::ErrorKind::PermissionDenied
                | std::io::ErrorKind::InvalidInput => ErrorClass::Permanent,
                _ => ErrorClass::Transient,
            },
            _ => ErrorClass::Permanent,
        }
    }

    /// Human-readable error class plus message, for run summaries
    pub fn summary(&self) -> String {
        let class = match self.class() {
            ErrorClass::Transient => "transient",
            ErrorClass::Permanent => "permanent",
        };
        format!("{}: {}", class, self)
    }

    /// Create a missing raw-file error pointing at the entity that needs it
    pub fn raw_file_not_found(path: PathBuf, entity: &str) -> Self {
        Self::FileNotFound {
            path,
            help: Some(format!(
                "Required by entity '{}'. Check 'raw_dir' in the pipeline file.",
                entity
            )),
        }
    }
}
