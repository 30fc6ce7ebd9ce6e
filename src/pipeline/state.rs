// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Run state tracking
//!
//! An explicit state object owned by the orchestrator and updated through
//! a single transition function. Every status change records timestamps
//! and attempt counts, so the run summary can report per-task
//! observability data without any module-level state.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::transform::TransformReport;

/// Task state machine: Pending -> Running -> {Retrying -> Running, Succeeded, Failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Retrying,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Retrying => write!(f, "retrying"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Observability record for one task
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub name: String,
    pub status: TaskStatus,
    pub attempts: u32,
    pub started_at: Option<NaiveDateTime>,
    pub finished_at: Option<NaiveDateTime>,
    /// Human-readable failure reason (error class + message)
    pub failure: Option<String>,
    /// Transformation report, for transform tasks that got that far
    pub report: Option<TransformReport>,
}

impl TaskRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: TaskStatus::Pending,
            attempts: 0,
            started_at: None,
            finished_at: None,
            failure: None,
            report: None,
        }
    }
}

/// A status transition applied through [`RunState::transition`]
#[derive(Debug)]
pub enum TaskTransition {
    /// Pending/Retrying -> Running; bumps the attempt counter
    Start,
    /// Running -> Retrying after a transient failure
    Retry { reason: String },
    /// Running -> Succeeded
    Succeed,
    /// Running -> Failed (permanent failure or exhausted retry budget)
    Fail { reason: String },
}

/// Aggregate outcome of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every declared task succeeded
    Succeeded,
    /// Some entities failed while others succeeded
    PartiallySucceeded,
    /// No task succeeded
    Failed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "successful"),
            Self::PartiallySucceeded => write!(f, "partially successful"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Current state of every task in a run
#[derive(Debug, Default)]
pub struct RunState {
    tasks: BTreeMap<String, TaskRecord>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task in Pending state
    pub fn declare(&mut self, name: &str) {
        self.tasks
            .entry(name.to_string())
            .or_insert_with(|| TaskRecord::new(name));
    }

    /// Apply one status transition. All state changes go through here.
    pub fn transition(&mut self, name: &str, transition: TaskTransition) {
        let Some(record) = self.tasks.get_mut(name) else {
            tracing::warn!(task = name, "transition for undeclared task ignored");
            return;
        };

        match transition {
            TaskTransition::Start => {
                record.status = TaskStatus::Running;
                record.attempts += 1;
                if record.started_at.is_none() {
                    record.started_at = Some(chrono::Utc::now().naive_utc());
                }
                tracing::debug!(task = name, attempt = record.attempts, "task running");
            }
            TaskTransition::Retry { reason } => {
                record.status = TaskStatus::Retrying;
                record.failure = Some(reason.clone());
                tracing::info!(task = name, attempt = record.attempts, "retrying: {}", reason);
            }
            TaskTransition::Succeed => {
                record.status = TaskStatus::Succeeded;
                record.finished_at = Some(chrono::Utc::now().naive_utc());
                record.failure = None;
            }
            TaskTransition::Fail { reason } => {
                record.status = TaskStatus::Failed;
                record.finished_at = Some(chrono::Utc::now().naive_utc());
                record.failure = Some(reason.clone());
                tracing::warn!(task = name, "task failed: {}", reason);
            }
        }
    }

    /// Attach a transformation report to a task's record
    pub fn attach_report(&mut self, name: &str, report: TransformReport) {
        if let Some(record) = self.tasks.get_mut(name) {
            record.report = Some(report);
        }
    }

    pub fn record(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.get(name)
    }

    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.tasks.get(name).map(|r| r.status)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.status(name).map(|s| s.is_terminal()).unwrap_or(false)
    }

    /// Records in stable (name) order
    pub fn records(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.values()
    }

    /// Aggregate run outcome over all declared tasks.
    ///
    /// Tasks left Pending (cancelled runs) count as not-succeeded.
    pub fn outcome(&self) -> RunOutcome {
        let total = self.tasks.len();
        let succeeded = self
            .tasks
            .values()
            .filter(|r| r.status == TaskStatus::Succeeded)
            .count();

        if total > 0 && succeeded == total {
            RunOutcome::Succeeded
        } else if succeeded > 0 {
            RunOutcome::PartiallySucceeded
        } else {
            RunOutcome::Failed
        }
    }
}
