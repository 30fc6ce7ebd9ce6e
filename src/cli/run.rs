// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Run command - execute the pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ConfigValidator, PipelineConfig};
use crate::pipeline::{ExecutionOptions, Orchestrator, RunOutcome, RunSummary, TaskStatus};
use crate::storage::FsObjectStore;
use crate::transform::TransformerRegistry;
use crate::utils::create_spinner;

/// Run the pipeline
pub async fn run(
    pipeline_path: PathBuf,
    entities: Vec<String>,
    skip_ingest: bool,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let config = PipelineConfig::from_file(&pipeline_path)?;

    let registry = TransformerRegistry::builtin();
    let validation = ConfigValidator::validate(&config, &registry);

    if !validation.is_valid() {
        eprintln!("{}", "Pipeline validation failed:".red().bold());
        for error in &validation.errors {
            eprintln!("  {} {}", "✗".red(), error);
        }
        return Err(miette::miette!("Pipeline configuration is invalid"));
    }

    if validation.has_warnings() && verbose {
        eprintln!("{}", "Pipeline warnings:".yellow().bold());
        for warning in &validation.warnings {
            eprintln!("  {} {}", "⚠".yellow(), warning);
        }
        eprintln!();
    }

    let store = Arc::new(FsObjectStore::new(config.storage.root.clone()));
    let orchestrator = Orchestrator::new(config, registry, store);

    let options = ExecutionOptions {
        entities,
        skip_ingest,
    };

    if dry_run {
        println!("{}", "Execution plan:".bold());
        println!();
        print!("{}", orchestrator.plan(&options)?);
        return Ok(());
    }

    // Ctrl-C stops scheduling; in-flight tasks still reach a terminal state
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight tasks");
            cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    let spinner = create_spinner("Running pipeline...");
    let summary = orchestrator.execute(&options).await?;
    spinner.finish_and_clear();

    print_summary(&summary, verbose);

    match summary.outcome {
        RunOutcome::Succeeded => Ok(()),
        RunOutcome::PartiallySucceeded => {
            Err(miette::miette!("Pipeline run was only partially successful"))
        }
        RunOutcome::Failed => Err(miette::miette!("Pipeline run failed")),
    }
}

/// Print the per-task run summary
fn print_summary(summary: &RunSummary, verbose: bool) {
    println!("{}", "Run summary".bold());
    println!("{}", "═".repeat(40));

    for task in &summary.tasks {
        let marker = match task.status {
            TaskStatus::Succeeded => "✓".green(),
            TaskStatus::Failed => "✗".red(),
            _ => "○".dimmed(),
        };
        let attempts = if task.attempts > 1 {
            format!(" ({} attempts)", task.attempts).dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {} {}{}", marker, task.name, attempts);

        if let Some(reason) = &task.failure {
            println!("      {}", reason.dimmed());
        }

        if let Some(report) = &task.report {
            println!(
                "      {} in, {} accepted, {} rejected, {} deduped, {} orphaned",
                report.rows_in,
                report.rows_accepted.to_string().green(),
                report.rows_rejected_schema,
                report.rows_dropped_dedup,
                report.rows_dropped_fk
            );
            if verbose {
                for warning in &report.warnings {
                    println!("      {} {}", "⚠".yellow(), warning);
                }
            }
        }
    }

    println!();
    let outcome = match summary.outcome {
        RunOutcome::Succeeded => format!("{}", summary.outcome).green().bold(),
        RunOutcome::PartiallySucceeded => format!("{}", summary.outcome).yellow().bold(),
        RunOutcome::Failed => format!("{}", summary.outcome).red().bold(),
    };
    println!(
        "Run {} in {:.2}s",
        outcome,
        summary.duration.as_secs_f64()
    );
}
