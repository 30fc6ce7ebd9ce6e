// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Graph command - visualize the task graph

use miette::Result;
use std::path::PathBuf;
use std::sync::Arc;

use super::GraphFormat;
use crate::config::PipelineConfig;
use crate::pipeline::{ExecutionOptions, Orchestrator, TaskGraph};
use crate::storage::FsObjectStore;
use crate::transform::TransformerRegistry;

/// Run the graph command
pub async fn run(pipeline_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    let config = PipelineConfig::from_file(&pipeline_path)?;

    let store = Arc::new(FsObjectStore::new(config.storage.root.clone()));
    let orchestrator = Orchestrator::new(config, TransformerRegistry::builtin(), store);

    let options = ExecutionOptions::default();
    let specs = orchestrator.task_specs(&options)?;
    let graph = TaskGraph::build(&specs)?;

    let output = match format {
        GraphFormat::Text => graph.to_text()?,
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Mermaid => graph.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
