//! Cluster description files (`cluster.toml`).
//!
//! ```toml
//! [[nodes]]
//! node_id = "node-a"
//! status = "active"
//! load = 10.0
//!
//! [nodes.capabilities]
//! cpu_count = 4
//! memory_gb = 8.0
//! devices = ["cpu"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use shardline_core::Node;

use crate::membership::InMemoryCluster;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterFile {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl ClusterFile {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading cluster file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing cluster file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let file: ClusterFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        for node in &file.nodes {
            if !seen.insert(node.node_id.as_str()) {
                bail!("duplicate node id `{}`", node.node_id);
            }
            if !(0.0..=100.0).contains(&node.load) {
                bail!("node `{}` has load {} outside 0..=100", node.node_id, node.load);
            }
        }
        Ok(file)
    }

    pub fn into_cluster(self) -> InMemoryCluster {
        InMemoryCluster::with_nodes(self.nodes)
    }
}
