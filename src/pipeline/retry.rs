// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Retry policy
//!
//! An explicit policy object consumed by the task runner, rather than
//! retry logic woven into task bodies.

use std::time::Duration;

/// Retry, backoff, and timeout policy for every pipeline task
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per task, including the first
    pub max_attempts: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Wall-clock budget per attempt; exceeding it counts as transient
    pub task_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            task_timeout: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based): base * 2^(attempt-1)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt is allowed after `attempt` attempts
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
