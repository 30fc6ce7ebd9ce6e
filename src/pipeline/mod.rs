// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Pipeline orchestration
//!
//! The orchestrator turns the configured entities into a task graph
//! (ingest and transform tasks with ordering edges), runs it with retry,
//! backoff, and per-task timeouts, and tracks every task through an
//! explicit state machine. Entity failures are isolated: one bad entity
//! degrades the run to partially successful instead of aborting it.

pub mod dag;
pub mod executor;
pub mod retry;
pub mod state;

pub use dag::{TaskGraph, TaskSpec};
pub use executor::{ExecutionOptions, Orchestrator, RunSummary};
pub use retry::RetryPolicy;
pub use state::{RunOutcome, RunState, TaskRecord, TaskStatus, TaskTransition};
