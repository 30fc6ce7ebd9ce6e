// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! lakeflow - Batch ETL for e-commerce analytics
//!
//! Ingest, validate, transform, and publish e-commerce entity data.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lakeflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lakeflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { name } => lakeflow::cli::init::run(name, cli.verbose).await,
        Commands::Run {
            pipeline,
            entity,
            skip_ingest,
            dry_run,
        } => lakeflow::cli::run::run(pipeline, entity, skip_ingest, dry_run, cli.verbose).await,
        Commands::Validate { pipeline } => {
            lakeflow::cli::validate::run(pipeline, cli.verbose).await
        }
        Commands::Graph { pipeline, format } => {
            lakeflow::cli::graph::run(pipeline, format, cli.verbose).await
        }
    }
}
