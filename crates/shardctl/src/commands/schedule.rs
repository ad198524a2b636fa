use std::path::Path;

use shardline_core::Requirements;

/// Place one task and print the placement as pretty JSON.
pub async fn schedule(
    cluster: &Path,
    config: Option<&Path>,
    task: &str,
    constraint: Option<&str>,
    overrides: Requirements,
) -> anyhow::Result<()> {
    let config = super::load_config(config)?;
    let requirements = merge_requirements(&config.defaults, overrides);
    let scheduler = super::build_scheduler(cluster, config).await?;

    let placement = scheduler
        .schedule_task(task, constraint, requirements)
        .await?;

    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}

/// Fields given on the command line replace the configured defaults.
///
/// Returns `None` when nothing was overridden so the scheduler applies its
/// own defaults.
fn merge_requirements(defaults: &Requirements, overrides: Requirements) -> Option<Requirements> {
    if overrides == Requirements::default() {
        return None;
    }
    Some(Requirements {
        memory_gb: overrides.memory_gb.or(defaults.memory_gb),
        cpu_cores: overrides.cpu_cores.or(defaults.cpu_cores),
        device: overrides.device.or_else(|| defaults.device.clone()),
        size: overrides.size.or(defaults.size),
    })
}
