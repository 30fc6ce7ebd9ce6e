// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for lakeflow.

pub mod graph;
pub mod init;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Batch ETL pipeline for e-commerce analytics
///
/// Ingest raw entity files, validate and transform them, and write
/// analytics-ready columnar datasets.
#[derive(Parser, Debug)]
#[clap(
    name = "lakeflow",
    version,
    about = "Batch ETL pipeline for e-commerce analytics data",
    long_about = None,
    after_help = "Examples:\n\
        lakeflow init                   Scaffold a pipeline with sample data\n\
        lakeflow validate               Check the pipeline configuration\n\
        lakeflow run                    Ingest and transform every entity\n\
        lakeflow run -e orders          Process a single entity\n\
        lakeflow graph --format dot     Render the task graph\n\n\
        See 'lakeflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new lakeflow project with sample data
    Init {
        /// Pipeline name (defaults to current directory name)
        name: Option<String>,
    },

    /// Run the pipeline
    Run {
        /// Pipeline file
        #[clap(short, long, default_value = "lakeflow.yaml")]
        pipeline: PathBuf,

        /// Process only specific entities
        #[clap(short, long)]
        entity: Vec<String>,

        /// Skip raw-file ingestion and run transforms only
        #[clap(long)]
        skip_ingest: bool,

        /// Dry run (show the execution plan without running)
        #[clap(long)]
        dry_run: bool,
    },

    /// Validate pipeline configuration
    Validate {
        /// Pipeline file to validate
        #[clap(default_value = "lakeflow.yaml")]
        pipeline: PathBuf,
    },

    /// Show the task graph
    Graph {
        /// Pipeline file
        #[clap(default_value = "lakeflow.yaml")]
        pipeline: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "text", value_enum)]
        format: GraphFormat,
    },
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}
