// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! # lakeflow - Batch ETL for e-commerce analytics
//!
//! `lakeflow` ingests raw e-commerce entity files, validates and cleans
//! them, and writes analytics-ready columnar datasets.
//!
//! ## Features
//!
//! - **Schema validation** - Typed, per-row validation with rejection counts
//! - **Entity transformers** - Cleaning, dedup, and referential integrity per entity
//! - **Atomic datasets** - Columnar outputs written via temp-file rename
//! - **Business metrics** - Lifetime value, product performance, monthly sales
//! - **Orchestration** - Task graph with retry, backoff, and timeouts
//! - **Failure isolation** - One bad entity degrades the run, never aborts it
//!
//! ## Quick Start
//!
//! ```bash
//! # Scaffold a pipeline with sample data
//! lakeflow init
//!
//! # Check the configuration
//! lakeflow validate
//!
//! # Run the pipeline
//! lakeflow run
//!
//! # Inspect the task graph
//! lakeflow graph --format mermaid
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod schema;
pub mod storage;
pub mod table;
pub mod transform;
pub mod utils;
pub mod writer;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use errors::{LakeflowError, LakeflowResult};
pub use pipeline::{ExecutionOptions, Orchestrator, RunOutcome, RunSummary};
pub use transform::{TransformReport, TransformerRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
