// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Validate command - check pipeline configuration

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::config::{ConfigValidator, PipelineConfig};
use crate::transform::TransformerRegistry;

/// Run the validate command
pub async fn run(pipeline_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let config = match PipelineConfig::from_file(&pipeline_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("  {} Failed to parse pipeline", "✗".red());
            eprintln!();
            return Err(e.into());
        }
    };

    println!("  {} Pipeline file is valid YAML", "✓".green());

    let registry = TransformerRegistry::builtin();
    let validation = ConfigValidator::validate(&config, &registry);

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            println!("  {} {}", "✗".red(), error);
        }
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Pipeline summary".bold());
        println!("  Name: {}", config.name);
        println!("  Entities: {}", config.entities.join(", "));
        println!("  Raw directory: {}", config.raw_dir.display());
        println!("  Output directory: {}", config.output_dir.display());
        println!(
            "  Retry policy: {} attempts, {}ms base delay, {}s timeout",
            config.retry.max_attempts, config.retry.base_delay_ms, config.retry.task_timeout_secs
        );
    }

    println!();
    if validation.is_valid() {
        println!("{}", "Pipeline is valid".green().bold());
        Ok(())
    } else {
        Err(miette::miette!("Pipeline configuration is invalid"))
    }
}
