//! Shardline placement primitives: cost scoring and sharding.
//!
//! This crate holds the pure parts of a placement decision. It knows
//! nothing about where candidate nodes come from or how load is tracked
//! (that's `shardline-scheduler`).
//!
//! # Components
//!
//! - **`cost`**: Node cost model (memory, cpu, device, load, headroom)
//! - **`shard`**: Fixed 2-way splitting of oversized tasks

pub mod cost;
pub mod shard;

pub use cost::{CostBreakdown, CostModel};
pub use shard::{DEFAULT_SHARD_THRESHOLD, Shard, Sharder};
pub use shardline_core::CostWeights;
