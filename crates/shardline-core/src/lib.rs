//! shardline-core: domain types and configuration shared by every
//! Shardline crate.

pub mod config;
pub mod types;

pub use config::{CostAggregation, CostWeights, SchedulerConfig};
pub use types::*;
