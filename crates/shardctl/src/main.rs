//! shardctl: drive the Shardline scheduler from the command line.
//!
//! # Usage
//!
//! ```text
//! shardctl schedule --cluster cluster.toml --task train --constraint "device == gpu"
//! shardctl simulate --cluster cluster.toml --tasks batch.toml --format prometheus
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shardline_core::Requirements;

mod commands;

#[derive(Parser)]
#[command(
    name = "shardctl",
    about = "Shardline — cost-based task placement",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a single task and print the placement as JSON.
    Schedule {
        /// Cluster description (TOML).
        #[arg(long)]
        cluster: PathBuf,
        /// Scheduler configuration (TOML). Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Task name; shard names are derived from it.
        #[arg(long)]
        task: String,
        /// Placement constraint, e.g. "device == gpu && memory_gb >= 16".
        #[arg(long)]
        constraint: Option<String>,
        #[arg(long)]
        memory_gb: Option<f64>,
        #[arg(long)]
        cpu_cores: Option<u32>,
        #[arg(long)]
        device: Option<String>,
        /// Work size; above the sharding threshold the task is split in two.
        #[arg(long)]
        size: Option<f64>,
    },
    /// Schedule a batch of tasks with history, tune, and report statistics.
    Simulate {
        #[arg(long)]
        cluster: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Task batch (TOML, `[[tasks]]` entries).
        #[arg(long)]
        tasks: PathBuf,
        /// Output format: json or prometheus
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Tuning strategy applied after the batch: noop or headroom
        #[arg(long, default_value = "headroom")]
        tuning: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Schedule {
            cluster,
            config,
            task,
            constraint,
            memory_gb,
            cpu_cores,
            device,
            size,
        } => {
            let overrides = Requirements {
                memory_gb,
                cpu_cores,
                device,
                size,
            };
            commands::schedule::schedule(
                &cluster,
                config.as_deref(),
                &task,
                constraint.as_deref(),
                overrides,
            )
            .await
        }
        Commands::Simulate {
            cluster,
            config,
            tasks,
            format,
            tuning,
        } => {
            commands::simulate::simulate(&cluster, config.as_deref(), &tasks, &format, &tuning)
                .await
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,shardline=debug"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
