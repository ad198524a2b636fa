//! In-memory cluster: node registry, membership, and placement log.
//!
//! Implements both [`PlacementEngine`] and [`ClusterSource`] over an
//! insertion-ordered node list, so a scheduler can run standalone or in
//! tests without any external collaborator.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use shardline_core::{Capabilities, Node, NodeId, NodeStatus};

use crate::constraint::Constraint;
use crate::error::{ClusterError, ClusterResult};
use crate::source::{ClusterSource, PlacementEngine};

/// A placement notification received through [`PlacementEngine::place_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRecord {
    pub task: String,
    pub constraint: String,
}

#[derive(Debug, Default)]
struct Inner {
    /// Registration order is preserved; it decides cost ties.
    nodes: Vec<Node>,
    placements: Vec<PlacementRecord>,
}

/// Shared in-memory cluster view.
///
/// `Clone` is cheap (backed by `Arc`) and all clones see the same nodes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCluster {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cluster from a list of nodes, keeping their order.
    pub fn with_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let cluster = Self::new();
        for node in nodes {
            cluster.add_node(node);
        }
        cluster
    }

    /// Register a node, or replace an existing one in place.
    pub fn add_node(&self, node: Node) {
        let mut inner = self.write();
        match inner.nodes.iter_mut().find(|n| n.node_id == node.node_id) {
            Some(existing) => {
                debug!(node_id = %node.node_id, "node re-registered");
                *existing = node;
            }
            None => {
                info!(node_id = %node.node_id, status = ?node.status, "node joined cluster");
                inner.nodes.push(node);
            }
        }
    }

    /// Remove a node from the cluster.
    pub fn remove_node(&self, node_id: &str) -> bool {
        let mut inner = self.write();
        let before = inner.nodes.len();
        inner.nodes.retain(|n| n.node_id != node_id);
        let existed = inner.nodes.len() != before;
        if existed {
            info!(%node_id, "node left cluster");
        }
        existed
    }

    pub fn set_status(&self, node_id: &str, status: NodeStatus) -> ClusterResult<()> {
        let mut inner = self.write();
        let node = inner
            .nodes
            .iter_mut()
            .find(|n| n.node_id == node_id)
            .ok_or_else(|| ClusterError::NodeNotFound(node_id.to_string()))?;
        if node.status != status {
            info!(%node_id, from = ?node.status, to = ?status, "node status changed");
            node.status = status;
        }
        Ok(())
    }

    /// Record a reported load percentage, clamped to 0..=100.
    pub fn set_load(&self, node_id: &str, load: f64) -> ClusterResult<()> {
        let mut inner = self.write();
        let node = inner
            .nodes
            .iter_mut()
            .find(|n| n.node_id == node_id)
            .ok_or_else(|| ClusterError::NodeNotFound(node_id.to_string()))?;
        node.load = load.clamp(0.0, 100.0);
        debug!(%node_id, load = node.load, "load reported");
        Ok(())
    }

    pub fn get_node(&self, node_id: &str) -> Option<Node> {
        self.read().nodes.iter().find(|n| n.node_id == node_id).cloned()
    }

    /// All registered nodes, in registration order.
    pub fn nodes(&self) -> Vec<Node> {
        self.read().nodes.clone()
    }

    /// Nodes currently eligible for new work.
    pub fn schedulable_nodes(&self) -> Vec<Node> {
        self.read()
            .nodes
            .iter()
            .filter(|n| n.status.is_schedulable())
            .cloned()
            .collect()
    }

    /// Placement notifications received so far.
    pub fn placements(&self) -> Vec<PlacementRecord> {
        self.read().placements.clone()
    }

    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().nodes.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlacementEngine for InMemoryCluster {
    type Expr = Constraint;

    fn node_registry(&self) -> ClusterResult<Vec<(NodeId, Capabilities)>> {
        Ok(self
            .schedulable_nodes()
            .into_iter()
            .map(|n| (n.node_id, n.capabilities))
            .collect())
    }

    fn parse_constraint(&self, text: &str) -> ClusterResult<Constraint> {
        Constraint::parse(text)
    }

    fn validate_constraint(
        &self,
        expr: &Constraint,
        nodes: &[(NodeId, Capabilities)],
    ) -> Vec<NodeId> {
        nodes
            .iter()
            .filter(|(id, caps)| expr.matches(id, caps))
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn place_task(&self, task: &str, constraint: &str) -> ClusterResult<()> {
        self.write().placements.push(PlacementRecord {
            task: task.to_string(),
            constraint: constraint.to_string(),
        });
        Ok(())
    }
}

impl ClusterSource for InMemoryCluster {
    fn get_nodes(&self) -> ClusterResult<Vec<NodeId>> {
        Ok(self
            .schedulable_nodes()
            .into_iter()
            .map(|n| n.node_id)
            .collect())
    }

    fn get_node_capabilities(&self, node_id: &str) -> ClusterResult<Option<Capabilities>> {
        match self.get_node(node_id) {
            Some(node) => Ok(Some(node.capabilities)),
            None => {
                warn!(%node_id, "capabilities requested for unknown node");
                Err(ClusterError::NodeNotFound(node_id.to_string()))
            }
        }
    }
}
