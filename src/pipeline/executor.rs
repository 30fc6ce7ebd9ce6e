// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 lakeflow contributors

//! Pipeline orchestrator
//!
//! Builds the task graph for the selected entities, then drives tasks to
//! completion with bounded concurrency: a task is scheduled once every
//! dependency has reached a terminal state. Dependency edges are ordering
//! edges, not success gates, so a failed parent never blocks its
//! dependents from running; it only changes what data they see.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use crate::config::PipelineConfig;
use crate::errors::{ErrorClass, LakeflowError, LakeflowResult};
use crate::ingest::IngestTask;
use crate::pipeline::dag::{TaskGraph, TaskSpec};
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::state::{RunOutcome, RunState, TaskRecord, TaskTransition};
use crate::storage::ObjectStore;
use crate::table::read_csv;
use crate::transform::{run_transform, ParentTables, TransformerRegistry};
use crate::writer::DatasetWriter;

/// Per-run execution options
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Entities to process; empty means every configured entity
    pub entities: Vec<String>,
    /// Skip the raw-file uploads and run transforms only
    pub skip_ingest: bool,
}

/// Final run summary handed to the caller
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub tasks: Vec<TaskRecord>,
    pub duration: Duration,
}

/// Drives one pipeline run end to end
pub struct Orchestrator {
    config: PipelineConfig,
    registry: Arc<TransformerRegistry>,
    store: Arc<dyn ObjectStore>,
    policy: RetryPolicy,
    cancelled: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(
        config: PipelineConfig,
        registry: TransformerRegistry,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let policy = config.retry_policy();
        Self {
            config,
            registry: Arc::new(registry),
            store,
            policy,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that aborts scheduling of further tasks when set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Entities selected for this run, in configured order
    fn selected_entities(&self, options: &ExecutionOptions) -> LakeflowResult<Vec<String>> {
        if options.entities.is_empty() {
            return Ok(self.config.entities.clone());
        }
        for entity in &options.entities {
            if !self.config.entities.contains(entity) {
                return Err(LakeflowError::UnknownEntity {
                    entity: entity.clone(),
                });
            }
        }
        // keep configured order regardless of how the selection was spelled
        Ok(self
            .config
            .entities
            .iter()
            .filter(|e| options.entities.contains(e))
            .cloned()
            .collect())
    }

    /// Build the task specs for a run.
    ///
    /// Each entity gets an ingest task and a transform task. The two are
    /// independent: a transform reads the raw file directly, so it orders
    /// itself only after the transforms of its foreign-key parents, not
    /// after its own ingest. When the selection includes the sales tables
    /// a business-metrics task is appended after every transform.
    pub fn task_specs(&self, options: &ExecutionOptions) -> LakeflowResult<Vec<TaskSpec>> {
        let entities = self.selected_entities(options)?;
        let selected: HashSet<&str> = entities.iter().map(String::as_str).collect();
        let mut specs = Vec::new();

        for entity in &entities {
            if !options.skip_ingest {
                specs.push(TaskSpec::new(format!("ingest:{}", entity), Vec::new()));
            }

            let mut deps = Vec::new();
            if let Some(rules) = self.registry.get(entity) {
                for fk in rules.foreign_keys() {
                    if selected.contains(fk.parent) {
                        deps.push(format!("transform:{}", fk.parent));
                    }
                }
            }
            specs.push(TaskSpec::new(format!("transform:{}", entity), deps));
        }

        if entities.iter().any(|e| e == "orders" || e == "order_items") {
            let deps = entities
                .iter()
                .map(|e| format!("transform:{}", e))
                .collect();
            specs.push(TaskSpec::new("metrics:business", deps));
        }

        Ok(specs)
    }

    /// Render the execution plan without running anything
    pub fn plan(&self, options: &ExecutionOptions) -> LakeflowResult<String> {
        TaskGraph::build(&self.task_specs(options)?)?.to_text()
    }

    /// Execute the pipeline and return the per-task summary.
    ///
    /// Individual task failures are recorded, not propagated; only setup
    /// problems (bad selection, cyclic graph, unwritable output directory)
    /// return an error.
    pub async fn execute(&self, options: &ExecutionOptions) -> LakeflowResult<RunSummary> {
        let started = Instant::now();
        let specs = self.task_specs(options)?;
        let graph = TaskGraph::build(&specs)?;
        let writer = Arc::new(DatasetWriter::new(&self.config.output_dir)?);

        let state = Arc::new(Mutex::new(RunState::new()));
        {
            let mut state = state.lock().expect("run state lock");
            for spec in &specs {
                state.declare(&spec.name);
            }
        }

        let clean_tables: Arc<Mutex<ParentTables>> = Arc::new(Mutex::new(ParentTables::new()));
        let mut in_flight: HashSet<String> = HashSet::new();
        let mut join_set: JoinSet<String> = JoinSet::new();

        tracing::info!(
            pipeline = %self.config.name,
            tasks = specs.len(),
            "run started"
        );

        loop {
            if !self.cancelled.load(Ordering::Relaxed) {
                let ready = self.ready_tasks(&specs, &graph, &state, &in_flight);
                for name in ready {
                    in_flight.insert(name.clone());
                    join_set.spawn(self.spawn_task(
                        name,
                        state.clone(),
                        clean_tables.clone(),
                        writer.clone(),
                    ));
                }
            }

            match join_set.join_next().await {
                Some(Ok(name)) => {
                    in_flight.remove(&name);
                }
                Some(Err(join_err)) => {
                    // a panicked task cannot be identified; stop scheduling
                    tracing::error!("task panicked: {}", join_err);
                    self.cancelled.store(true, Ordering::Relaxed);
                    in_flight.clear();
                }
                None => {
                    if in_flight.is_empty() {
                        break;
                    }
                    tracing::warn!("scheduler drained with tasks still marked in flight");
                    break;
                }
            }
        }

        let state = state.lock().expect("run state lock");
        let summary = RunSummary {
            outcome: state.outcome(),
            tasks: state.records().cloned().collect(),
            duration: started.elapsed(),
        };

        tracing::info!(
            outcome = %summary.outcome,
            duration_ms = summary.duration.as_millis() as u64,
            "run finished"
        );
        Ok(summary)
    }

    /// Pending tasks whose dependencies have all reached a terminal state
    fn ready_tasks(
        &self,
        specs: &[TaskSpec],
        graph: &TaskGraph,
        state: &Mutex<RunState>,
        in_flight: &HashSet<String>,
    ) -> Vec<String> {
        let state = state.lock().expect("run state lock");
        specs
            .iter()
            .filter(|spec| {
                !in_flight.contains(&spec.name)
                    && !state.is_terminal(&spec.name)
                    && graph
                        .dependencies(&spec.name)
                        .iter()
                        .all(|dep| state.is_terminal(dep))
            })
            .map(|spec| spec.name.clone())
            .collect()
    }

    /// Build the future that runs one named task through the retry loop
    fn spawn_task(
        &self,
        name: String,
        state: Arc<Mutex<RunState>>,
        clean_tables: Arc<Mutex<ParentTables>>,
        writer: Arc<DatasetWriter>,
    ) -> impl std::future::Future<Output = String> + Send + 'static {
        let config = self.config.clone();
        let registry = self.registry.clone();
        let store = self.store.clone();
        let policy = self.policy.clone();

        async move {
            let Some((kind, entity)) = name.split_once(':') else {
                tracing::error!(task = %name, "malformed task name");
                return name;
            };
            let entity = entity.to_string();

            match kind {
                "ingest" => {
                    let task = IngestTask::new(&entity, config.raw_path(&entity));
                    run_with_retry(&name, &policy, &state, || {
                        let task = task.clone();
                        let store = store.clone();
                        async move { task.run(store.as_ref()).await.map(|_| ()) }
                    })
                    .await;
                }
                "transform" => {
                    run_with_retry(&name, &policy, &state, || {
                        let config = config.clone();
                        let registry = registry.clone();
                        let entity = entity.clone();
                        let clean_tables = clean_tables.clone();
                        let writer = writer.clone();
                        let store = store.clone();
                        let state = state.clone();
                        let task_name = name.clone();
                        async move {
                            let rules = registry.get(&entity).ok_or_else(|| {
                                LakeflowError::UnknownEntity {
                                    entity: entity.clone(),
                                }
                            })?;
                            let schema = config.schemas.get(&entity).ok_or_else(|| {
                                LakeflowError::UnknownEntity {
                                    entity: entity.clone(),
                                }
                            })?;

                            let raw = read_csv(&config.raw_path(&entity), &entity)?;
                            let parents =
                                clean_tables.lock().expect("clean tables lock").clone();
                            let (table, report) =
                                run_transform(rules.as_ref(), schema, &raw, &parents)?;

                            let dataset_path = writer.write(&table, &entity)?;

                            // publish the dataset alongside the raw upload
                            let bytes = tokio::fs::read(&dataset_path).await?;
                            let key = crate::writer::dataset_key(&entity);
                            store
                                .put(&key, &bytes)
                                .await
                                .map_err(|e| storage_error(&key, e))?;

                            clean_tables
                                .lock()
                                .expect("clean tables lock")
                                .insert(entity.clone(), table);
                            state
                                .lock()
                                .expect("run state lock")
                                .attach_report(&task_name, report);
                            Ok(())
                        }
                    })
                    .await;
                }
                "metrics" => {
                    run_with_retry(&name, &policy, &state, || {
                        let config = config.clone();
                        let clean_tables = clean_tables.clone();
                        let store = store.clone();
                        async move {
                            let tables =
                                clean_tables.lock().expect("clean tables lock").clone();
                            let (metrics, warnings) =
                                crate::metrics::business_metrics(&tables);
                            for warning in &warnings {
                                tracing::warn!(task = "metrics", "{}", warning);
                            }

                            let writer = DatasetWriter::new(
                                config.output_dir.join(crate::metrics::METRICS_KEY_PREFIX),
                            )?;
                            for metric in metrics {
                                let dataset_path = writer.write(&metric, &metric.name)?;
                                let bytes = tokio::fs::read(&dataset_path).await?;
                                let key = crate::writer::dataset_key(&format!(
                                    "{}/{}",
                                    crate::metrics::METRICS_KEY_PREFIX,
                                    metric.name
                                ));
                                store
                                    .put(&key, &bytes)
                                    .await
                                    .map_err(|e| storage_error(&key, e))?;
                            }
                            Ok(())
                        }
                    })
                    .await;
                }
                other => {
                    tracing::error!(task = %name, kind = other, "unknown task kind");
                }
            }

            name
        }
    }
}

/// Map a store failure to a pipeline error, keeping its classification
fn storage_error(key: &str, error: crate::storage::StorageError) -> LakeflowError {
    let transient = error.class() == ErrorClass::Transient;
    LakeflowError::Storage {
        key: key.to_string(),
        message: error.to_string(),
        transient,
    }
}

/// Run one operation under the retry policy, recording every transition.
///
/// Permanent failures fail the task immediately. Transient failures retry
/// with exponential backoff until the attempt budget runs out. Each attempt
/// runs under the policy's wall-clock timeout, and a timeout counts as a
/// transient failure.
async fn run_with_retry<F, Fut>(
    name: &str,
    policy: &RetryPolicy,
    state: &Mutex<RunState>,
    operation: F,
) where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = LakeflowResult<()>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        state
            .lock()
            .expect("run state lock")
            .transition(name, TaskTransition::Start);

        let result = match tokio::time::timeout(policy.task_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(LakeflowError::TaskTimeout {
                task: name.to_string(),
                timeout_secs: policy.task_timeout.as_secs(),
            }),
        };

        let error = match result {
            Ok(()) => {
                state
                    .lock()
                    .expect("run state lock")
                    .transition(name, TaskTransition::Succeed);
                return;
            }
            Err(error) => error,
        };

        if error.class() == ErrorClass::Permanent {
            state.lock().expect("run state lock").transition(
                name,
                TaskTransition::Fail {
                    reason: error.summary(),
                },
            );
            return;
        }

        if !policy.allows_retry(attempt) {
            state.lock().expect("run state lock").transition(
                name,
                TaskTransition::Fail {
                    reason: format!("{} (retry budget exhausted)", error.summary()),
                },
            );
            return;
        }

        state.lock().expect("run state lock").transition(
            name,
            TaskTransition::Retry {
                reason: error.summary(),
            },
        );
        tokio::time::sleep(policy.backoff_delay(attempt)).await;
    }
}
