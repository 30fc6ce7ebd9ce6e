// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! End-to-end CLI tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lakeflow() -> Command {
    Command::cargo_bin("lakeflow").expect("binary builds")
}

#[test]
fn help_lists_commands() {
    lakeflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("graph"));
}

#[test]
fn init_scaffolds_project() {
    let dir = TempDir::new().unwrap();

    lakeflow()
        .args(["-C", dir.path().to_str().unwrap(), "init", "shop-data"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lakeflow.yaml"));

    assert!(dir.path().join("lakeflow.yaml").exists());
    assert!(dir.path().join("data/raw/customers.csv").exists());
    assert!(dir.path().join("data/raw/reviews.csv").exists());
}

#[test]
fn validate_accepts_scaffolded_project() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline is valid"));
}

#[test]
fn validate_fails_without_pipeline_file() {
    let dir = TempDir::new().unwrap();

    lakeflow()
        .args(["-C", dir.path().to_str().unwrap(), "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lakeflow init"));
}

#[test]
fn graph_renders_dot() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "graph", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph pipeline"))
        .stdout(predicate::str::contains("\"transform:customers\" -> \"transform:orders\""));
}

#[test]
fn graph_default_format_lists_tasks() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "graph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest:customers"))
        .stdout(predicate::str::contains("transform:reviews"));
}

#[test]
fn graph_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "graph", "--format", "png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("possible values"));
}

#[test]
fn run_dry_run_prints_plan() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest:customers"))
        .stdout(predicate::str::contains("transform:order_items"));
}

#[test]
fn run_processes_scaffolded_data() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run summary"));

    for entity in ["customers", "products", "orders", "order_items", "reviews"] {
        assert!(
            dir.path().join(format!("data/processed/{}.json", entity)).exists(),
            "missing dataset for {}",
            entity
        );
        assert!(
            dir.path().join(format!("data/lake/raw-data/{}.csv", entity)).exists(),
            "missing raw object for {}",
            entity
        );
        assert!(
            dir.path().join(format!("data/lake/processed/{}.json", entity)).exists(),
            "missing published dataset for {}",
            entity
        );
    }

    for metric in ["customer_lifetime_value", "product_performance", "monthly_sales"] {
        assert!(
            dir.path().join(format!("data/processed/metrics/{}.json", metric)).exists(),
            "missing metric dataset {}",
            metric
        );
    }
}

#[test]
fn run_single_entity() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    lakeflow().args(["-C", dir_arg, "init"]).assert().success();

    lakeflow()
        .args(["-C", dir_arg, "run", "--entity", "customers"])
        .assert()
        .success();

    assert!(dir.path().join("data/processed/customers.json").exists());
    assert!(!dir.path().join("data/processed/orders.json").exists());
}
