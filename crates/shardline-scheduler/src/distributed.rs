//! Distributed scheduler: placement plus history and rolling statistics.
//!
//! Wraps a [`Scheduler`] without changing its decisions. Every call is
//! timed and recorded as a [`SchedulingEvent`], and the aggregate
//! [`SchedulingStatistics`] are updated incrementally.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shardline_core::{Requirements, epoch_millis};

use crate::error::SchedulerResult;
use crate::scheduler::{Placement, Scheduler};
use crate::tuning::{NoopTuning, TuningStrategy};

/// One scheduling attempt. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingEvent {
    pub task: String,
    /// Unix timestamp (milliseconds) when the attempt started.
    pub timestamp: u64,
    pub duration: Duration,
    pub constraint: Option<String>,
    /// Effective requirements, after defaulting.
    pub requirements: Requirements,
    /// `None` when the attempt failed.
    pub result: Option<Placement>,
    pub error: Option<String>,
}

impl SchedulingEvent {
    pub fn succeeded(&self) -> bool {
        self.result.as_ref().is_some_and(|p| p.total_cost.is_finite())
    }
}

/// Rolling counters over all scheduling attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingStatistics {
    pub total_tasks: u64,
    pub successful_schedules: u64,
    pub failed_schedules: u64,
    /// Mean total cost over successful schedules.
    pub average_cost: f64,
    /// Mean call duration in seconds over all attempts.
    pub average_time: f64,
}

impl SchedulingStatistics {
    /// Fold one attempt into the running means.
    ///
    /// `cost` is `None` for attempts that returned an error. Non-finite
    /// costs count as failures.
    pub fn record(&mut self, duration: Duration, cost: Option<f64>) {
        self.total_tasks += 1;

        match cost {
            Some(cost) if cost.is_finite() => {
                self.successful_schedules += 1;
                self.average_cost +=
                    (cost - self.average_cost) / self.successful_schedules as f64;
            }
            _ => self.failed_schedules += 1,
        }

        self.average_time +=
            (duration.as_secs_f64() - self.average_time) / self.total_tasks as f64;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.successful_schedules as f64 / self.total_tasks as f64
        }
    }
}

#[derive(Default)]
struct History {
    events: VecDeque<SchedulingEvent>,
    stats: SchedulingStatistics,
}

/// A [`Scheduler`] that keeps a scheduling history and statistics.
pub struct DistributedScheduler {
    scheduler: Scheduler,
    history: Mutex<History>,
    /// Oldest events are evicted beyond this many. `None` keeps all.
    history_limit: Option<usize>,
    tuning: Box<dyn TuningStrategy>,
}

impl DistributedScheduler {
    /// Wrap `scheduler`; the history limit comes from its configuration.
    pub fn new(scheduler: Scheduler) -> Self {
        let history_limit = scheduler.history_limit();
        Self {
            scheduler,
            history: Mutex::new(History::default()),
            history_limit,
            tuning: Box::new(NoopTuning),
        }
    }

    /// Use `strategy` for [`optimize_scheduling`](Self::optimize_scheduling).
    pub fn with_tuning(mut self, strategy: impl TuningStrategy + 'static) -> Self {
        self.tuning = Box::new(strategy);
        self
    }

    pub fn inner(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Schedule a task exactly like [`Scheduler::schedule_task`], recording
    /// the attempt. Errors are recorded and then returned unchanged.
    ///
    /// The history lock is held across the placement, so events are
    /// recorded in the order placements were decided.
    pub async fn schedule_with_history(
        &self,
        task: &str,
        constraint: Option<&str>,
        requirements: Option<Requirements>,
    ) -> SchedulerResult<Placement> {
        let requirements =
            requirements.unwrap_or_else(|| self.scheduler.default_requirements().clone());

        let mut history = self.history.lock().await;
        let timestamp = epoch_millis();
        let started = Instant::now();

        let result = self
            .scheduler
            .schedule_task(task, constraint, Some(requirements.clone()))
            .await;

        let duration = started.elapsed();
        let cost = result.as_ref().ok().map(|p| p.total_cost);

        let event = SchedulingEvent {
            task: task.to_string(),
            timestamp,
            duration,
            constraint: constraint.map(str::to_string),
            requirements,
            result: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(ToString::to_string),
        };

        history.stats.record(duration, cost);
        history.events.push_back(event);
        if let Some(limit) = self.history_limit {
            while history.events.len() > limit {
                history.events.pop_front();
            }
        }
        debug!(
            %task,
            total = history.stats.total_tasks,
            failed = history.stats.failed_schedules,
            elapsed_us = duration.as_micros() as u64,
            "scheduling attempt recorded"
        );
        drop(history);

        result
    }

    /// Recorded events, oldest first.
    pub async fn scheduling_history(&self) -> Vec<SchedulingEvent> {
        self.history.lock().await.events.iter().cloned().collect()
    }

    pub async fn scheduling_stats(&self) -> SchedulingStatistics {
        self.history.lock().await.stats.clone()
    }

    /// Clear the history and zero every counter.
    pub async fn reset_statistics(&self) {
        let mut history = self.history.lock().await;
        history.events.clear();
        history.stats = SchedulingStatistics::default();
        info!("scheduling statistics reset");
    }

    /// Let the tuning strategy adjust the cost weights from recorded history.
    ///
    /// Returns `true` when the scheduler's weights changed. A proposal is
    /// dropped if the weights were replaced while it was being computed.
    pub async fn optimize_scheduling(&self) -> bool {
        let current = self.scheduler.cost_weights().await;

        let proposal = {
            let mut history = self.history.lock().await;
            let stats = history.stats.clone();
            let events = history.events.make_contiguous();
            self.tuning.tune(events, &stats, &current)
        };

        match proposal {
            Some(weights) if weights != current => {
                if !self.scheduler.replace_cost_weights(&current, weights.clone()).await {
                    warn!(strategy = self.tuning.name(), "weights changed concurrently, proposal dropped");
                    return false;
                }
                info!(
                    strategy = self.tuning.name(),
                    ?weights,
                    "cost weights tuned"
                );
                true
            }
            _ => {
                debug!(strategy = self.tuning.name(), "no tuning applied");
                false
            }
        }
    }
}
