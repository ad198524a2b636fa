//! Feedback-driven cost weight tuning.
//!
//! A [`TuningStrategy`] looks at recorded scheduling history and may
//! propose new [`CostWeights`]. The distributed scheduler applies the
//! proposal when asked to optimize.

use tracing::debug;

use shardline_core::CostWeights;

use crate::distributed::{SchedulingEvent, SchedulingStatistics};

pub trait TuningStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Propose replacement weights, or `None` to keep the current ones.
    fn tune(
        &self,
        history: &[SchedulingEvent],
        stats: &SchedulingStatistics,
        weights: &CostWeights,
    ) -> Option<CostWeights>;
}

/// Never changes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTuning;

impl TuningStrategy for NoopTuning {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn tune(
        &self,
        _history: &[SchedulingEvent],
        _stats: &SchedulingStatistics,
        _weights: &CostWeights,
    ) -> Option<CostWeights> {
        None
    }
}

/// Raises the headroom penalty while too many shards land on hot nodes.
///
/// Looks at the shard placements of the most recent `window` successful
/// events. If the share of shards placed on a node already above the
/// headroom threshold exceeds `max_hot_ratio`, the penalty is multiplied by
/// `step`, capped at `max_penalty`.
#[derive(Debug, Clone)]
pub struct HeadroomTuning {
    pub window: usize,
    pub max_hot_ratio: f64,
    pub step: f64,
    pub max_penalty: f64,
}

impl Default for HeadroomTuning {
    fn default() -> Self {
        Self {
            window: 50,
            max_hot_ratio: 0.25,
            step: 1.5,
            max_penalty: 1000.0,
        }
    }
}

impl TuningStrategy for HeadroomTuning {
    fn name(&self) -> &'static str {
        "headroom"
    }

    fn tune(
        &self,
        history: &[SchedulingEvent],
        _stats: &SchedulingStatistics,
        weights: &CostWeights,
    ) -> Option<CostWeights> {
        let (hot, total) = history
            .iter()
            .rev()
            .filter_map(|e| e.result.as_ref())
            .take(self.window)
            .flat_map(|p| p.placements.iter())
            .fold((0usize, 0usize), |(hot, total), p| {
                let is_hot = p.load_before > weights.headroom_threshold;
                (hot + usize::from(is_hot), total + 1)
            });

        if total == 0 || weights.headroom_penalty >= self.max_penalty {
            return None;
        }

        let ratio = hot as f64 / total as f64;
        debug!(hot, total, ratio, "headroom pressure");
        if ratio <= self.max_hot_ratio {
            return None;
        }

        let penalty = (weights.headroom_penalty * self.step).min(self.max_penalty);
        Some(CostWeights {
            headroom_penalty: penalty,
            ..weights.clone()
        })
    }
}
