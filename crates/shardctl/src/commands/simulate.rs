//! `shardctl simulate`: replay a task batch through the distributed
//! scheduler and report statistics.
//!
//! ```toml
//! [[tasks]]
//! name = "etl"
//!
//! [[tasks]]
//! name = "train"
//! priority = 5
//! constraint = "device == gpu"
//! [tasks.requirements]
//! memory_gb = 16.0
//! size = 24.0
//! ```

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use shardline_core::{CostWeights, Requirements};
use shardline_scheduler::{
    DistributedScheduler, HeadroomTuning, NoopTuning, SchedulingStatistics, render_prometheus,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskBatch {
    #[serde(default)]
    pub tasks: Vec<BatchTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchTask {
    pub name: String,
    /// Higher runs first; ties keep file order.
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub constraint: Option<String>,
    /// Missing requirements fall back to the scheduler defaults.
    #[serde(default)]
    pub requirements: Option<Requirements>,
}

impl TaskBatch {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading task batch {}", path.display()))?;
        let batch = toml::from_str(&content)
            .with_context(|| format!("parsing task batch {}", path.display()))?;
        Ok(batch)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub task: String,
    pub error: String,
}

/// Outcome of a simulated batch.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub statistics: SchedulingStatistics,
    pub success_rate: f64,
    /// Whether the tuning pass changed the cost weights.
    pub tuned: bool,
    /// Scheduler run flag at the end of the batch.
    pub running: bool,
    /// Task names in the order they were scheduled.
    pub order: Vec<String>,
    pub cost_weights: CostWeights,
    pub load: BTreeMap<String, f64>,
    pub failures: Vec<TaskFailure>,
}

pub async fn simulate(
    cluster: &Path,
    config: Option<&Path>,
    tasks: &Path,
    format: &str,
    tuning: &str,
) -> anyhow::Result<()> {
    if !matches!(format, "json" | "prometheus") {
        bail!("unknown output format `{format}` (expected json or prometheus)");
    }

    let config = super::load_config(config)?;
    let batch = TaskBatch::from_file(tasks)?;
    let scheduler = super::build_scheduler(cluster, config).await?;
    let scheduler = match tuning {
        "noop" => DistributedScheduler::new(scheduler).with_tuning(NoopTuning),
        "headroom" => DistributedScheduler::new(scheduler).with_tuning(HeadroomTuning::default()),
        other => bail!("unknown tuning strategy `{other}` (expected noop or headroom)"),
    };

    let report = run_batch(&scheduler, &batch).await;

    match format {
        "prometheus" => {
            let load = scheduler.inner().current_load().await;
            print!("{}", render_prometheus(&report.statistics, &load));
        }
        _ => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Schedule every task, highest priority first, then run one tuning pass.
///
/// Failed tasks are collected and do not stop the batch.
pub async fn run_batch(scheduler: &DistributedScheduler, batch: &TaskBatch) -> SimulationReport {
    let mut failures = Vec::new();

    let mut queue: Vec<&BatchTask> = batch.tasks.iter().collect();
    queue.sort_by_key(|t| Reverse(t.priority));
    let order: Vec<String> = queue.iter().map(|t| t.name.clone()).collect();

    for task in queue {
        let result = scheduler
            .schedule_with_history(&task.name, task.constraint.as_deref(), task.requirements.clone())
            .await;
        if let Err(e) = result {
            failures.push(TaskFailure {
                task: task.name.clone(),
                error: e.to_string(),
            });
        }
    }

    let tuned = scheduler.optimize_scheduling().await;
    let statistics = scheduler.scheduling_stats().await;

    info!(
        tasks = batch.tasks.len(),
        failed = failures.len(),
        tuned,
        "batch simulated"
    );

    SimulationReport {
        success_rate: statistics.success_rate(),
        statistics,
        tuned,
        running: scheduler.inner().is_running(),
        order,
        cost_weights: scheduler.inner().cost_weights().await,
        load: scheduler.inner().current_load().await.into_iter().collect(),
        failures,
    }
}
