//! Candidate node resolution.
//!
//! The scheduler asks a [`NodeSource`] for the nodes a shard may land on.
//! Three sources exist, from richest to simplest:
//!
//! - [`ConstraintNodeSource`]: a [`PlacementEngine`] filters its registry
//!   by the caller's constraint
//! - [`ClusterNodeSource`]: a [`ClusterSource`] lists every node; the
//!   constraint is ignored
//! - [`DefaultNodeSource`]: one synthetic node, for running in isolation

use tracing::{debug, warn};

use shardline_cluster::{ClusterResult, ClusterSource, PlacementEngine};
use shardline_core::{Capabilities, NodeId};

/// Node ID of the synthetic node offered by [`DefaultNodeSource`].
pub const DEFAULT_NODE_ID: &str = "default";

/// A node eligible for a shard, with the capabilities to score it by.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub node_id: NodeId,
    pub capabilities: Capabilities,
}

impl Candidate {
    pub fn new(node_id: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            node_id: node_id.into(),
            capabilities,
        }
    }
}

/// Where the scheduler gets its candidate nodes.
pub trait NodeSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Candidates for a shard, in preference order for cost ties.
    fn candidates(&self, constraint: Option<&str>) -> ClusterResult<Vec<Candidate>>;

    /// Called once a task has been fully placed.
    fn record_placement(&self, _task: &str, _constraint: Option<&str>) -> ClusterResult<()> {
        Ok(())
    }
}

/// Candidates from a constraint-aware placement engine.
pub struct ConstraintNodeSource<E> {
    engine: E,
}

impl<E: PlacementEngine> ConstraintNodeSource<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: PlacementEngine> NodeSource for ConstraintNodeSource<E> {
    fn name(&self) -> &'static str {
        "constraint-engine"
    }

    fn candidates(&self, constraint: Option<&str>) -> ClusterResult<Vec<Candidate>> {
        let registry = self.engine.node_registry()?;

        let Some(text) = constraint else {
            return Ok(registry
                .into_iter()
                .map(|(id, caps)| Candidate::new(id, caps))
                .collect());
        };

        let expr = self.engine.parse_constraint(text)?;
        let eligible = self.engine.validate_constraint(&expr, &registry);

        let candidates = eligible
            .into_iter()
            .map(|id| {
                let capabilities = match registry.iter().find(|(rid, _)| *rid == id) {
                    Some((_, caps)) => caps.clone(),
                    None => {
                        warn!(node_id = %id, "validated node missing from registry");
                        Capabilities::default()
                    }
                };
                Candidate::new(id, capabilities)
            })
            .collect();
        Ok(candidates)
    }

    fn record_placement(&self, task: &str, constraint: Option<&str>) -> ClusterResult<()> {
        self.engine.place_task(task, constraint.unwrap_or_default())
    }
}

/// Candidates from a plain cluster node list.
pub struct ClusterNodeSource<C> {
    cluster: C,
}

impl<C: ClusterSource> ClusterNodeSource<C> {
    pub fn new(cluster: C) -> Self {
        Self { cluster }
    }
}

impl<C: ClusterSource> NodeSource for ClusterNodeSource<C> {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn candidates(&self, constraint: Option<&str>) -> ClusterResult<Vec<Candidate>> {
        if let Some(text) = constraint {
            debug!(constraint = text, "cluster source cannot evaluate constraints, ignoring");
        }

        let nodes = self.cluster.get_nodes()?;
        let candidates = nodes
            .into_iter()
            .map(|id| {
                let capabilities = match self.cluster.get_node_capabilities(&id) {
                    Ok(Some(caps)) => caps,
                    Ok(None) => Capabilities::default(),
                    Err(e) => {
                        warn!(node_id = %id, error = %e, "capability lookup failed, using defaults");
                        Capabilities::default()
                    }
                };
                Candidate::new(id, capabilities)
            })
            .collect();
        Ok(candidates)
    }
}

/// A single synthetic node with no advertised capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeSource;

impl NodeSource for DefaultNodeSource {
    fn name(&self) -> &'static str {
        "default"
    }

    fn candidates(&self, _constraint: Option<&str>) -> ClusterResult<Vec<Candidate>> {
        Ok(vec![Candidate::new(DEFAULT_NODE_ID, Capabilities::default())])
    }
}
