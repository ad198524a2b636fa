pub mod schedule;
pub mod simulate;

use std::path::Path;

use tracing::info;

use shardline_cluster::ClusterFile;
use shardline_core::SchedulerConfig;
use shardline_scheduler::Scheduler;

/// Load the scheduler configuration, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SchedulerConfig> {
    match path {
        Some(path) => SchedulerConfig::from_file(path),
        None => Ok(SchedulerConfig::default()),
    }
}

/// Build a scheduler over the nodes in a cluster file.
///
/// Loads reported in the file seed the simulated load table.
pub async fn build_scheduler(cluster: &Path, config: SchedulerConfig) -> anyhow::Result<Scheduler> {
    let file = ClusterFile::from_file(cluster)?;
    let seed: Vec<_> = file
        .nodes
        .iter()
        .filter(|n| n.load > 0.0)
        .map(|n| (n.node_id.clone(), n.load))
        .collect();

    info!(path = %cluster.display(), nodes = file.nodes.len(), "cluster loaded");

    let scheduler = Scheduler::with_engine(config, file.into_cluster());
    scheduler.seed_load(seed).await;
    Ok(scheduler)
}
