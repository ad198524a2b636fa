//! shardline-scheduler: cost-based task placement.
//!
//! Turns a task and an optional placement constraint into shard → node
//! assignments. The scheduler:
//!
//! - Splits oversized tasks into two shards
//! - Resolves candidate nodes through an injected [`NodeSource`]
//! - Picks the cheapest node per shard (first-seen wins ties)
//! - Tracks simulated per-node load across calls
//!
//! [`DistributedScheduler`] adds a scheduling history, rolling statistics
//! and pluggable weight tuning on top.
//!
//! # Architecture
//!
//! ```text
//! DistributedScheduler
//!   ├── history + SchedulingStatistics
//!   ├── TuningStrategy (optimize_scheduling)
//!   └── Scheduler
//!       ├── Sharder + CostModel (shardline-placement)
//!       ├── NodeSource
//!       │   ├── ConstraintNodeSource (PlacementEngine)
//!       │   ├── ClusterNodeSource    (ClusterSource)
//!       │   └── DefaultNodeSource    (single synthetic node)
//!       └── simulated load table
//! ```

pub mod distributed;
pub mod error;
pub mod node_source;
pub mod prometheus;
pub mod scheduler;
pub mod tuning;

pub use distributed::{DistributedScheduler, SchedulingEvent, SchedulingStatistics};
pub use error::{SchedulerError, SchedulerResult};
pub use node_source::{
    Candidate, ClusterNodeSource, ConstraintNodeSource, DEFAULT_NODE_ID, DefaultNodeSource,
    NodeSource,
};
pub use prometheus::render_prometheus;
pub use scheduler::{Placement, PlacementCallback, Scheduler, SchedulerStatus, ShardPlacement};
pub use tuning::{HeadroomTuning, NoopTuning, TuningStrategy};
