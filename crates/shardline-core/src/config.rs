//! Scheduler configuration (`shardline.toml`).
//!
//! Every section is optional; omitted sections and keys fall back to the
//! defaults below.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::Requirements;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub cost_aggregation: CostAggregation,
    pub cost: CostWeights,
    pub sharding: ShardingConfig,
    pub load: LoadConfig,
    /// Requirements used when a caller passes none.
    pub defaults: Requirements,
    pub history: HistoryConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cost_aggregation: CostAggregation::default(),
            cost: CostWeights::default(),
            sharding: ShardingConfig::default(),
            load: LoadConfig::default(),
            defaults: Requirements::standard(),
            history: HistoryConfig::default(),
        }
    }
}

/// Tunable constants of the cost function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostWeights {
    /// Flat penalty when available memory is below the requirement.
    pub memory_shortfall_penalty: f64,
    /// Multiplier on required / available memory.
    pub memory_pressure: f64,
    /// Multiplier on required / available cores.
    pub cpu_pressure: f64,
    /// Flat penalty when the requested device is not advertised.
    pub device_mismatch_penalty: f64,
    /// Multiplier on the node's load percentage.
    pub load_factor: f64,
    /// Load percentage above which the headroom penalty applies.
    pub headroom_threshold: f64,
    /// Flat penalty for nodes above the headroom threshold.
    pub headroom_penalty: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            memory_shortfall_penalty: 1000.0,
            memory_pressure: 10.0,
            cpu_pressure: 5.0,
            device_mismatch_penalty: 50.0,
            load_factor: 2.0,
            headroom_threshold: 80.0,
            headroom_penalty: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShardingConfig {
    /// Requirements with a size strictly above this are split in two.
    pub threshold: f64,
}

impl Default for ShardingConfig {
    fn default() -> Self {
        Self { threshold: 10.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadConfig {
    /// Simulated load percentage added per unit of shard size.
    pub per_size_unit: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self { per_size_unit: 10.0 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum retained scheduling events. `None` keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// How per-shard costs fold into a placement's `total_cost`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CostAggregation {
    #[default]
    Sum,
    Max,
    /// Cost of the last shard placed.
    Last,
}

impl CostAggregation {
    pub fn aggregate(&self, costs: &[f64]) -> f64 {
        match self {
            CostAggregation::Sum => costs.iter().sum(),
            CostAggregation::Max => costs.iter().copied().fold(0.0, f64::max),
            CostAggregation::Last => costs.last().copied().unwrap_or(0.0),
        }
    }
}

impl SchedulerConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scheduler config {}", path.display()))?;
        let config: SchedulerConfig = toml::from_str(&content)
            .with_context(|| format!("parsing scheduler config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid scheduler config {}", path.display()))?;
        Ok(config)
    }

    /// Reject weights and scaling factors that are negative or not finite.
    pub fn validate(&self) -> anyhow::Result<()> {
        let w = &self.cost;
        let values = [
            ("cost.memory_shortfall_penalty", w.memory_shortfall_penalty),
            ("cost.memory_pressure", w.memory_pressure),
            ("cost.cpu_pressure", w.cpu_pressure),
            ("cost.device_mismatch_penalty", w.device_mismatch_penalty),
            ("cost.load_factor", w.load_factor),
            ("cost.headroom_threshold", w.headroom_threshold),
            ("cost.headroom_penalty", w.headroom_penalty),
            ("sharding.threshold", self.sharding.threshold),
            ("load.per_size_unit", self.load.per_size_unit),
        ];
        for (key, value) in values {
            if !value.is_finite() || value < 0.0 {
                bail!("`{key}` must be a finite, non-negative number (got {value})");
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
