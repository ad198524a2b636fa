//! Collaborator contracts consumed by the scheduler.
//!
//! A `PlacementEngine` knows a node registry and can filter it with a
//! constraint expression. A `ClusterSource` only lists nodes and their
//! capabilities. Both are synchronous from the scheduler's viewpoint;
//! remote-backed implementations must return an error instead of blocking
//! indefinitely.

use shardline_core::{Capabilities, NodeId};

use crate::error::ClusterResult;

/// Constraint-aware node registry.
pub trait PlacementEngine: Send + Sync {
    /// Parsed form of a constraint expression.
    type Expr;

    /// Registered nodes and their capabilities, in registration order.
    fn node_registry(&self) -> ClusterResult<Vec<(NodeId, Capabilities)>>;

    fn parse_constraint(&self, text: &str) -> ClusterResult<Self::Expr>;

    /// IDs of the `nodes` satisfying `expr`, preserving input order.
    fn validate_constraint(
        &self,
        expr: &Self::Expr,
        nodes: &[(NodeId, Capabilities)],
    ) -> Vec<NodeId>;

    /// Notification that `task` was placed under `constraint`.
    fn place_task(&self, task: &str, constraint: &str) -> ClusterResult<()>;
}

/// Plain cluster membership view.
pub trait ClusterSource: Send + Sync {
    fn get_nodes(&self) -> ClusterResult<Vec<NodeId>>;

    /// `Ok(None)` when the node advertises nothing.
    fn get_node_capabilities(&self, node_id: &str) -> ClusterResult<Option<Capabilities>>;
}
