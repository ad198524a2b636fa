//! Task sharding: split oversized work into independently placed pieces.
//!
//! This is a fixed 2-way split: anything above the size threshold becomes
//! two halves, everything else passes through untouched.

use serde::{Deserialize, Serialize};

use shardline_core::Requirements;

/// Default size above which a task is split.
pub const DEFAULT_SHARD_THRESHOLD: f64 = 10.0;

/// A sub-unit of a task placed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shard {
    pub name: String,
    pub requirements: Requirements,
}

#[derive(Debug, Clone)]
pub struct Sharder {
    threshold: f64,
}

impl Sharder {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Split `requirements` for task `name`.
    ///
    /// Returns `{name}_shard_0` and `{name}_shard_1`, each carrying half the
    /// size, when the size exceeds the threshold. Otherwise returns a single
    /// shard named `name` with the requirements unchanged.
    pub fn shard_task(&self, name: &str, requirements: &Requirements) -> Vec<Shard> {
        let size = requirements.size();
        if size <= self.threshold {
            return vec![Shard {
                name: name.to_string(),
                requirements: requirements.clone(),
            }];
        }

        let half = size / 2.0;
        (0..2)
            .map(|i| Shard {
                name: format!("{name}_shard_{i}"),
                requirements: Requirements {
                    size: Some(half),
                    ..requirements.clone()
                },
            })
            .collect()
    }
}

impl Default for Sharder {
    fn default() -> Self {
        Self::new(DEFAULT_SHARD_THRESHOLD)
    }
}
