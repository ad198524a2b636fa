//! shardline-cluster: collaborators the scheduler consumes.
//!
//! Defines the constraint-engine and cluster-source contracts and ships an
//! in-memory implementation of both, so the scheduler runs standalone.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   └── NodeSource (shardline-scheduler)
//!       ├── PlacementEngine  → node registry + constraint filtering
//!       └── ClusterSource    → plain node list + capabilities
//!
//! InMemoryCluster
//!   ├── implements PlacementEngine (Constraint expressions)
//!   ├── implements ClusterSource
//!   └── loaded from cluster.toml via ClusterFile
//! ```

pub mod constraint;
pub mod error;
pub mod file;
pub mod membership;
pub mod source;

pub use constraint::{Clause, Constraint, Op};
pub use error::{ClusterError, ClusterResult};
pub use file::ClusterFile;
pub use membership::{InMemoryCluster, PlacementRecord};
pub use source::{ClusterSource, PlacementEngine};
