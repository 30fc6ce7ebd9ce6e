// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Utility modules
//!
//! Common utilities for the lakeflow CLI.

pub mod spinner;

pub use spinner::*;
