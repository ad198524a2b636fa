//! Node cost model for placement decisions.
//!
//! Scores a (requirement, capability, load) triple. Lower is better.
//! The total is a sum of:
//! - **Memory pressure**: required / available memory, or a flat shortfall penalty
//! - **CPU pressure**: required / available cores
//! - **Device mismatch**: flat penalty when the requested device is missing
//! - **Load balancing**: proportional to the node's current load
//! - **Headroom**: flat penalty once load crosses the headroom threshold
//!
//! Nothing here rejects a node outright. Infeasibility shows up as a large
//! cost so the scheduler can always produce a best-effort placement.

use serde::{Deserialize, Serialize};

use shardline_core::{Capabilities, CostWeights, Requirements};

/// Individual cost components for debugging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub memory: f64,
    pub cpu: f64,
    pub device: f64,
    pub load: f64,
    pub headroom: f64,
}

impl CostBreakdown {
    /// Sum of all components. NaN is reported as +∞.
    pub fn total(&self) -> f64 {
        let total = self.memory + self.cpu + self.device + self.load + self.headroom;
        if total.is_nan() { f64::INFINITY } else { total }
    }
}

/// Weighted cost function over node capabilities and load.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    weights: CostWeights,
}

impl CostModel {
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: CostWeights) {
        self.weights = weights;
    }

    /// Cost of placing `req` on a node with `caps` at `load` percent.
    pub fn calculate_cost(&self, req: &Requirements, caps: &Capabilities, load: f64) -> f64 {
        self.breakdown(req, caps, load).total()
    }

    /// Per-component cost of placing `req` on a node with `caps` at `load` percent.
    pub fn breakdown(&self, req: &Requirements, caps: &Capabilities, load: f64) -> CostBreakdown {
        let w = &self.weights;
        // Unknown load counts as saturated.
        let load = if load.is_nan() { 100.0 } else { load.max(0.0) };
        let free_fraction = 1.0 - load / 100.0;

        // Memory: proportional pressure, or a flat penalty when it won't fit.
        let required_memory = req.memory_gb();
        let available_memory = caps.memory_gb() * free_fraction;
        let memory = if available_memory < required_memory {
            w.memory_shortfall_penalty
        } else if available_memory > 0.0 {
            (required_memory / available_memory) * w.memory_pressure
        } else {
            0.0
        };

        // CPU: a node with no free cores cannot take any work.
        let required_cpu = f64::from(req.cpu_cores());
        let available_cpu = f64::from(caps.cpu_count()) * free_fraction;
        let cpu = if required_cpu == 0.0 {
            0.0
        } else if available_cpu <= 0.0 {
            f64::INFINITY
        } else {
            (required_cpu / available_cpu) * w.cpu_pressure
        };

        let device = match &req.device {
            Some(device) if !caps.has_device(device) => w.device_mismatch_penalty,
            _ => 0.0,
        };

        let headroom = if load > w.headroom_threshold {
            w.headroom_penalty
        } else {
            0.0
        };

        CostBreakdown {
            memory: non_negative(memory),
            cpu: non_negative(cpu),
            device: non_negative(device),
            load: non_negative(load * w.load_factor),
            headroom: non_negative(headroom),
        }
    }
}

/// Clamp a cost term at zero. NaN becomes +∞.
fn non_negative(term: f64) -> f64 {
    if term.is_nan() { f64::INFINITY } else { term.max(0.0) }
}
