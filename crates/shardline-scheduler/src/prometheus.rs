//! Prometheus text exposition format.
//!
//! Renders scheduling statistics and simulated node load for scraping by a
//! Prometheus server or compatible agent.

use std::collections::HashMap;
use std::fmt::Write;

use crate::distributed::SchedulingStatistics;

/// Render statistics and per-node simulated load in Prometheus text format.
///
/// Nodes are emitted in ID order so output is stable between scrapes.
pub fn render_prometheus(stats: &SchedulingStatistics, load: &HashMap<String, f64>) -> String {
    let mut out = String::new();

    out.push_str("# HELP shardline_schedules_total Scheduling attempts.\n");
    out.push_str("# TYPE shardline_schedules_total counter\n");
    let _ = writeln!(out, "shardline_schedules_total {}", stats.total_tasks);

    out.push_str("# HELP shardline_schedules_successful_total Attempts that placed every shard.\n");
    out.push_str("# TYPE shardline_schedules_successful_total counter\n");
    let _ = writeln!(
        out,
        "shardline_schedules_successful_total {}",
        stats.successful_schedules
    );

    out.push_str("# HELP shardline_schedules_failed_total Attempts without a finite-cost placement.\n");
    out.push_str("# TYPE shardline_schedules_failed_total counter\n");
    let _ = writeln!(out, "shardline_schedules_failed_total {}", stats.failed_schedules);

    out.push_str("# HELP shardline_average_cost Mean placement cost over successful schedules.\n");
    out.push_str("# TYPE shardline_average_cost gauge\n");
    let _ = writeln!(out, "shardline_average_cost {:.4}", stats.average_cost);

    out.push_str("# HELP shardline_average_time_seconds Mean scheduling call duration.\n");
    out.push_str("# TYPE shardline_average_time_seconds gauge\n");
    let _ = writeln!(out, "shardline_average_time_seconds {:.6}", stats.average_time);

    out.push_str("# HELP shardline_node_simulated_load Simulated load percentage per node.\n");
    out.push_str("# TYPE shardline_node_simulated_load gauge\n");
    let mut nodes: Vec<_> = load.iter().collect();
    nodes.sort_by(|a, b| a.0.cmp(b.0));
    for (node_id, value) in nodes {
        let _ = writeln!(
            out,
            "shardline_node_simulated_load{{node=\"{node_id}\"}} {value:.2}"
        );
    }

    out
}
