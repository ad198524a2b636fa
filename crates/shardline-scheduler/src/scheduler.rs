//! Scheduler: places tasks on the lowest-cost node.
//!
//! The `Scheduler` is the decision loop that:
//! - Splits oversized tasks into shards
//! - Resolves candidate nodes for each shard through a [`NodeSource`]
//! - Scores candidates with the [`CostModel`] against simulated load
//! - Commits the winning placements and bumps simulated load
//! - Notifies an optional placement callback
//!
//! One mutex guards the whole resolve → score → select → update → record
//! section, so concurrent callers always see each other's load.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shardline_cluster::{ClusterSource, PlacementEngine};
use shardline_core::{CostAggregation, CostWeights, NodeId, Requirements, SchedulerConfig, Task};
use shardline_placement::{CostModel, Shard, Sharder};

use crate::error::{SchedulerError, SchedulerResult};
use crate::node_source::{
    Candidate, ClusterNodeSource, ConstraintNodeSource, DefaultNodeSource, NodeSource,
};

/// Two-state run flag. It never affects decisions already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatus {
    Stopped,
    Running,
}

/// Where one shard landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardPlacement {
    pub shard: String,
    pub node_id: NodeId,
    pub cost: f64,
    /// Simulated load of the node when it was chosen.
    pub load_before: f64,
}

/// Result of scheduling one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub task: String,
    /// Shard name → node ID.
    pub shards: BTreeMap<String, NodeId>,
    /// Per-shard breakdown, in shard order.
    pub placements: Vec<ShardPlacement>,
    /// Shard costs folded by the configured [`CostAggregation`].
    pub total_cost: f64,
}

impl Placement {
    /// Node of the first shard; where a task is reported as assigned.
    pub fn primary_node(&self) -> Option<&str> {
        self.placements.first().map(|p| p.node_id.as_str())
    }
}

/// Called with every committed placement, after the state lock is released.
pub type PlacementCallback = Box<dyn Fn(&Placement) + Send + Sync>;

/// Mutable scheduling state, guarded as a unit.
struct SchedulerState {
    cost_model: CostModel,
    /// node_id → simulated load percentage.
    load: HashMap<NodeId, f64>,
    /// Names of scheduled tasks, in scheduling order.
    tasks: Vec<String>,
}

/// Cost-based task placement scheduler.
pub struct Scheduler {
    source: Box<dyn NodeSource>,
    sharder: Sharder,
    defaults: Requirements,
    load_per_size_unit: f64,
    aggregation: CostAggregation,
    history_limit: Option<usize>,
    running: AtomicBool,
    state: Mutex<SchedulerState>,
    on_placement: Option<PlacementCallback>,
}

impl Scheduler {
    /// Create a scheduler drawing candidates from `source`.
    pub fn new(config: SchedulerConfig, source: impl NodeSource + 'static) -> Self {
        info!(source = source.name(), "scheduler created");
        Self {
            source: Box::new(source),
            sharder: Sharder::new(config.sharding.threshold),
            defaults: config.defaults,
            load_per_size_unit: config.load.per_size_unit,
            aggregation: config.cost_aggregation,
            history_limit: config.history.limit,
            running: AtomicBool::new(false),
            state: Mutex::new(SchedulerState {
                cost_model: CostModel::new(config.cost),
                load: HashMap::new(),
                tasks: Vec::new(),
            }),
            on_placement: None,
        }
    }

    /// Register a callback invoked with each successful placement.
    pub fn with_placement_fn(mut self, f: PlacementCallback) -> Self {
        self.on_placement = Some(f);
        self
    }

    /// Scheduler backed by a constraint-aware placement engine.
    pub fn with_engine<E>(config: SchedulerConfig, engine: E) -> Self
    where
        E: PlacementEngine + 'static,
    {
        Self::new(config, ConstraintNodeSource::new(engine))
    }

    /// Scheduler backed by a plain cluster node list.
    pub fn with_cluster<C>(config: SchedulerConfig, cluster: C) -> Self
    where
        C: ClusterSource + 'static,
    {
        Self::new(config, ClusterNodeSource::new(cluster))
    }

    /// Scheduler with a single synthetic node, for isolated use.
    pub fn standalone(config: SchedulerConfig) -> Self {
        Self::new(config, DefaultNodeSource)
    }

    /// Place `task`, splitting it into shards if it is oversized.
    ///
    /// `requirements` defaults to the configured defaults. Fails only when a
    /// shard has no candidate node; in that case neither simulated load nor
    /// the task list is modified.
    pub async fn schedule_task(
        &self,
        task: &str,
        constraint: Option<&str>,
        requirements: Option<Requirements>,
    ) -> SchedulerResult<Placement> {
        let requirements = requirements.unwrap_or_else(|| self.defaults.clone());
        let shards = self.sharder.shard_task(task, &requirements);

        let mut state = self.state.lock().await;

        // Later shards must see load added by earlier ones, but nothing is
        // committed until every shard has a node.
        let mut load = state.load.clone();
        let mut placements = Vec::with_capacity(shards.len());

        for shard in &shards {
            let candidates = self.resolve_candidates(&shard.name, constraint);
            if candidates.is_empty() {
                warn!(%task, shard = %shard.name, ?constraint, "no valid nodes for shard");
                return Err(SchedulerError::NoValidNodes {
                    shard: shard.name.clone(),
                    constraint: constraint.map(str::to_string),
                });
            }

            let placement = select_node(&state.cost_model, shard, &candidates, &load);
            let delta = shard.requirements.size() * self.load_per_size_unit;
            if delta.is_finite() && delta >= 0.0 {
                *load.entry(placement.node_id.clone()).or_insert(0.0) += delta;
            } else {
                warn!(shard = %shard.name, delta, "load increment out of range, not applied");
            }

            debug!(
                shard = %placement.shard,
                node = %placement.node_id,
                cost = placement.cost,
                "shard placed"
            );
            placements.push(placement);
        }

        state.load = load;
        state.tasks.push(task.to_string());

        if let Err(e) = self.source.record_placement(task, constraint) {
            warn!(%task, error = %e, "placement notification failed");
        }
        drop(state);

        let costs: Vec<f64> = placements.iter().map(|p| p.cost).collect();
        let total_cost = self.aggregation.aggregate(&costs);
        let shards = placements
            .iter()
            .map(|p| (p.shard.clone(), p.node_id.clone()))
            .collect();

        info!(%task, shards = placements.len(), total_cost, "task scheduled");

        let placement = Placement {
            task: task.to_string(),
            shards,
            placements,
            total_cost,
        };
        if let Some(f) = &self.on_placement {
            f(&placement);
        }
        Ok(placement)
    }

    /// Schedule a [`Task`] by its own requirements and record the chosen
    /// node on it.
    pub async fn place(&self, task: &mut Task, constraint: Option<&str>) -> SchedulerResult<Placement> {
        let placement = self
            .schedule_task(&task.task_id, constraint, Some(task.requirements.clone()))
            .await?;
        if let Some(node_id) = placement.primary_node() {
            task.assign(node_id);
        }
        Ok(placement)
    }

    /// Place `tasks` highest priority first; equal priorities keep their
    /// order. The slice is left in placement order and one result is
    /// returned per task, in the same order.
    pub async fn place_by_priority(
        &self,
        tasks: &mut [Task],
        constraint: Option<&str>,
    ) -> Vec<SchedulerResult<Placement>> {
        tasks.sort_by_key(|t| Reverse(t.priority));

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks.iter_mut() {
            results.push(self.place(task, constraint).await);
        }
        results
    }

    pub fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("scheduler started");
        }
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SchedulerStatus {
        if self.is_running() {
            SchedulerStatus::Running
        } else {
            SchedulerStatus::Stopped
        }
    }

    /// Names of all scheduled tasks, oldest first.
    pub async fn scheduled_tasks(&self) -> Vec<String> {
        self.state.lock().await.tasks.clone()
    }

    /// Snapshot of the simulated load table.
    pub async fn current_load(&self) -> HashMap<NodeId, f64> {
        self.state.lock().await.load.clone()
    }

    /// Seed simulated load, e.g. from loads reported by the cluster.
    ///
    /// Negative values clamp to 0; non-finite values are skipped.
    pub async fn seed_load(&self, loads: impl IntoIterator<Item = (NodeId, f64)>) {
        let mut state = self.state.lock().await;
        for (node_id, load) in loads {
            if !load.is_finite() {
                warn!(%node_id, load, "ignoring non-finite seed load");
                continue;
            }
            state.load.insert(node_id, load.max(0.0));
        }
    }

    pub async fn reset_load(&self) {
        self.state.lock().await.load.clear();
        debug!("simulated load cleared");
    }

    pub async fn cost_weights(&self) -> CostWeights {
        self.state.lock().await.cost_model.weights().clone()
    }

    pub async fn set_cost_weights(&self, weights: CostWeights) {
        self.state.lock().await.cost_model.set_weights(weights);
    }

    /// Install `weights` only if the live weights still equal `expected`.
    ///
    /// Returns `false` and leaves the weights alone when they changed in
    /// the meantime.
    pub async fn replace_cost_weights(&self, expected: &CostWeights, weights: CostWeights) -> bool {
        let mut state = self.state.lock().await;
        if state.cost_model.weights() != expected {
            return false;
        }
        state.cost_model.set_weights(weights);
        true
    }

    pub fn default_requirements(&self) -> &Requirements {
        &self.defaults
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Candidates for a shard. Collaborator errors count as "no candidates".
    fn resolve_candidates(&self, shard: &str, constraint: Option<&str>) -> Vec<Candidate> {
        match self.source.candidates(constraint) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    %shard,
                    source = self.source.name(),
                    error = %e,
                    "candidate resolution failed"
                );
                Vec::new()
            }
        }
    }
}

/// Pick the cheapest candidate. Exact ties go to the earliest candidate.
///
/// `candidates` must not be empty.
fn select_node(
    model: &CostModel,
    shard: &Shard,
    candidates: &[Candidate],
    load: &HashMap<NodeId, f64>,
) -> ShardPlacement {
    let mut best: Option<ShardPlacement> = None;

    for candidate in candidates {
        let node_load = load.get(&candidate.node_id).copied().unwrap_or(0.0);
        let cost = model.calculate_cost(&shard.requirements, &candidate.capabilities, node_load);
        debug!(shard = %shard.name, node = %candidate.node_id, load = node_load, cost, "scored candidate");

        let better = best.as_ref().is_none_or(|b| cost < b.cost);
        if better {
            best = Some(ShardPlacement {
                shard: shard.name.clone(),
                node_id: candidate.node_id.clone(),
                cost,
                load_before: node_load,
            });
        }
    }

    best.unwrap_or_else(|| ShardPlacement {
        shard: shard.name.clone(),
        node_id: String::new(),
        cost: f64::INFINITY,
        load_before: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardline_cluster::InMemoryCluster;
    use shardline_core::{Capabilities, Node, TaskStatus};

    fn node(id: &str, cpu: u32, mem: f64, devices: &[&str]) -> Node {
        Node::new(id, Capabilities::new(cpu, mem, devices))
    }

    fn engine_scheduler(nodes: Vec<Node>) -> (Scheduler, InMemoryCluster) {
        let cluster = InMemoryCluster::with_nodes(nodes);
        let scheduler = Scheduler::with_engine(SchedulerConfig::default(), cluster.clone());
        (scheduler, cluster)
    }

    #[test]
    fn scheduler_starts_stopped() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        assert_eq!(scheduler.status(), SchedulerStatus::Stopped);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn start_stop_toggles_flag() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        scheduler.start();
        scheduler.start();
        assert_eq!(scheduler.status(), SchedulerStatus::Running);
        scheduler.stop();
        assert_eq!(scheduler.status(), SchedulerStatus::Stopped);
    }

    #[tokio::test]
    async fn standalone_places_on_default_node() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());

        let placement = scheduler.schedule_task("job", None, None).await.unwrap();

        assert_eq!(placement.task, "job");
        assert_eq!(placement.shards.get("job").map(String::as_str), Some("default"));
        assert_eq!(scheduler.current_load().await.get("default"), Some(&10.0));
    }

    #[tokio::test]
    async fn scheduling_does_not_require_running() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        scheduler.stop();
        assert!(scheduler.schedule_task("job", None, None).await.is_ok());
    }

    #[tokio::test]
    async fn picks_lowest_cost_node() {
        let (scheduler, _) = engine_scheduler(vec![
            node("small", 2, 4.0, &["cpu"]),
            node("large", 4, 8.0, &["cpu"]),
        ]);
        let req = Requirements::standard().with_memory_gb(2.0).with_cpu_cores(2);

        let placement = scheduler.schedule_task("job", None, Some(req)).await.unwrap();
        assert_eq!(placement.primary_node(), Some("large"));
    }

    #[tokio::test]
    async fn tie_goes_to_first_candidate() {
        let (scheduler, _) = engine_scheduler(vec![
            node("first", 4, 8.0, &["cpu"]),
            node("second", 4, 8.0, &["cpu"]),
        ]);

        let placement = scheduler.schedule_task("job", None, None).await.unwrap();
        assert_eq!(placement.primary_node(), Some("first"));
    }

    #[tokio::test]
    async fn simulated_load_spreads_work() {
        let (scheduler, _) = engine_scheduler(vec![
            node("a", 4, 8.0, &["cpu"]),
            node("b", 4, 8.0, &["cpu"]),
        ]);

        let first = scheduler.schedule_task("t1", None, None).await.unwrap();
        let second = scheduler.schedule_task("t2", None, None).await.unwrap();

        assert_eq!(first.primary_node(), Some("a"));
        assert_eq!(second.primary_node(), Some("b"));
        assert_eq!(second.placements[0].load_before, 0.0);
    }

    #[tokio::test]
    async fn oversized_task_shards_across_nodes() {
        let (scheduler, _) = engine_scheduler(vec![
            node("a", 4, 8.0, &["cpu"]),
            node("b", 4, 8.0, &["cpu"]),
        ]);
        let req = Requirements::standard().with_size(20.0);

        let placement = scheduler.schedule_task("big", None, Some(req)).await.unwrap();

        assert_eq!(placement.shards.len(), 2);
        assert_eq!(placement.shards["big_shard_0"], "a");
        // Shard 0 pushed a to 100% simulated load.
        assert_eq!(placement.shards["big_shard_1"], "b");
        let load = scheduler.current_load().await;
        assert_eq!(load["a"], 100.0);
        assert_eq!(load["b"], 100.0);
        assert_eq!(scheduler.scheduled_tasks().await, vec!["big"]);
    }

    #[tokio::test]
    async fn total_cost_sums_shards_by_default() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        let req = Requirements::standard().with_size(12.0);

        let placement = scheduler.schedule_task("big", None, Some(req)).await.unwrap();
        let sum: f64 = placement.placements.iter().map(|p| p.cost).sum();
        assert_eq!(placement.total_cost, sum);
    }

    #[tokio::test]
    async fn total_cost_last_shard_mode() {
        let config = SchedulerConfig {
            cost_aggregation: CostAggregation::Last,
            ..SchedulerConfig::default()
        };
        let scheduler = Scheduler::standalone(config);
        let req = Requirements::standard().with_size(12.0);

        let placement = scheduler.schedule_task("big", None, Some(req)).await.unwrap();
        assert_eq!(placement.total_cost, placement.placements[1].cost);
    }

    #[tokio::test]
    async fn constraint_restricts_candidates() {
        let (scheduler, cluster) = engine_scheduler(vec![
            node("cpu-node", 16, 64.0, &["cpu"]),
            node("gpu-node", 4, 16.0, &["cpu", "gpu"]),
        ]);

        let placement = scheduler
            .schedule_task("train", Some("device == gpu"), None)
            .await
            .unwrap();

        assert_eq!(placement.primary_node(), Some("gpu-node"));
        assert_eq!(cluster.placements().len(), 1);
        assert_eq!(cluster.placements()[0].constraint, "device == gpu");
    }

    #[tokio::test]
    async fn no_valid_nodes_is_an_error() {
        let (scheduler, cluster) = engine_scheduler(vec![node("a", 4, 8.0, &["cpu"])]);

        let err = scheduler
            .schedule_task("train", Some("device == tpu"), None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SchedulerError::NoValidNodes {
                shard: "train".to_string(),
                constraint: Some("device == tpu".to_string()),
            }
        );
        assert!(scheduler.scheduled_tasks().await.is_empty());
        assert!(cluster.placements().is_empty());
    }

    #[tokio::test]
    async fn invalid_constraint_maps_to_no_valid_nodes() {
        let (scheduler, _) = engine_scheduler(vec![node("a", 4, 8.0, &["cpu"])]);

        let result = scheduler.schedule_task("t", Some("colour == red"), None).await;
        assert!(matches!(result, Err(SchedulerError::NoValidNodes { .. })));
    }

    #[tokio::test]
    async fn empty_cluster_has_no_valid_nodes() {
        let scheduler =
            Scheduler::with_cluster(SchedulerConfig::default(), InMemoryCluster::new());

        let result = scheduler.schedule_task("t", None, None).await;
        assert!(matches!(result, Err(SchedulerError::NoValidNodes { .. })));
    }

    #[tokio::test]
    async fn cluster_source_scores_every_node() {
        let cluster = InMemoryCluster::with_nodes([
            node("weak", 1, 2.0, &["cpu"]),
            node("strong", 16, 64.0, &["cpu"]),
        ]);
        let scheduler = Scheduler::with_cluster(SchedulerConfig::default(), cluster);

        // The constraint is ignored by a plain cluster source.
        let placement = scheduler
            .schedule_task("t", Some("node == weak"), None)
            .await
            .unwrap();
        assert_eq!(placement.primary_node(), Some("strong"));
    }

    #[tokio::test]
    async fn place_assigns_task() {
        let (scheduler, _) = engine_scheduler(vec![node("a", 4, 8.0, &["cpu"])]);
        let mut task = Task::new("t-1", Requirements::standard()).with_priority(3);

        let placement = scheduler.place(&mut task, None).await.unwrap();

        assert_eq!(task.assigned_node.as_deref(), Some("a"));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(placement.task, "t-1");
    }

    #[tokio::test]
    async fn seed_and_reset_load() {
        let (scheduler, _) = engine_scheduler(vec![
            node("a", 4, 8.0, &["cpu"]),
            node("b", 4, 8.0, &["cpu"]),
        ]);
        scheduler.seed_load([("a".to_string(), 60.0)]).await;

        let placement = scheduler.schedule_task("t", None, None).await.unwrap();
        assert_eq!(placement.primary_node(), Some("b"));

        scheduler.reset_load().await;
        assert!(scheduler.current_load().await.is_empty());
    }

    #[tokio::test]
    async fn weights_can_be_replaced() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        let weights = CostWeights {
            headroom_penalty: 400.0,
            ..CostWeights::default()
        };

        scheduler.set_cost_weights(weights.clone()).await;
        assert_eq!(scheduler.cost_weights().await, weights);
    }

    #[tokio::test]
    async fn negative_size_never_lowers_load() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        let req = Requirements::standard().with_size(-3.0);

        let placement = scheduler.schedule_task("t", None, Some(req)).await.unwrap();

        assert_eq!(placement.shards.len(), 1);
        // Defaulted to size 1.
        assert_eq!(scheduler.current_load().await["default"], 10.0);
    }

    #[tokio::test]
    async fn non_finite_size_is_defaulted() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let scheduler = Scheduler::standalone(SchedulerConfig::default());
            let req = Requirements::standard().with_size(bad);

            let placement = scheduler.schedule_task("t", None, Some(req)).await.unwrap();

            let names: Vec<_> = placement.shards.keys().cloned().collect();
            assert_eq!(names, vec!["t"], "size {bad} was sharded");
            let load = scheduler.current_load().await;
            assert!(load["default"].is_finite(), "size {bad} corrupted load");
            assert_eq!(load["default"], 10.0);
        }
    }

    #[tokio::test]
    async fn malformed_memory_does_not_win_placement() {
        let (scheduler, _) = engine_scheduler(vec![
            node("small", 1, 2.0, &["cpu"]),
            node("large", 16, 64.0, &["cpu"]),
        ]);
        let req = Requirements::standard().with_memory_gb(-50.0);

        let placement = scheduler.schedule_task("t", None, Some(req)).await.unwrap();
        assert_eq!(placement.primary_node(), Some("large"));
        assert!(placement.total_cost >= 0.0);
    }

    #[tokio::test]
    async fn overflowing_load_increment_is_not_committed() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        let req = Requirements::standard().with_size(f64::MAX);

        scheduler.schedule_task("huge", None, Some(req)).await.unwrap();

        assert!(scheduler.current_load().await.values().all(|l| l.is_finite()));
    }

    #[tokio::test]
    async fn non_finite_seed_load_is_skipped() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        scheduler
            .seed_load([
                ("a".to_string(), f64::NAN),
                ("b".to_string(), -5.0),
                ("c".to_string(), f64::INFINITY),
            ])
            .await;

        let load = scheduler.current_load().await;
        assert_eq!(load.len(), 1);
        assert_eq!(load["b"], 0.0);
    }

    #[tokio::test]
    async fn placement_callback_sees_committed_placements() {
        use std::sync::{Arc, Mutex as StdMutex};

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let cluster = InMemoryCluster::with_nodes([node("a", 4, 8.0, &["cpu"])]);
        let scheduler = Scheduler::with_engine(SchedulerConfig::default(), cluster)
            .with_placement_fn(Box::new(move |p: &Placement| {
                let node = p.primary_node().map(str::to_string);
                sink.lock().unwrap().push((p.task.clone(), node));
            }));

        scheduler.schedule_task("ok", None, None).await.unwrap();
        let _ = scheduler.schedule_task("bad", Some("device == tpu"), None).await;

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("ok".to_string(), Some("a".to_string()))]);
    }

    #[tokio::test]
    async fn place_by_priority_orders_highest_first() {
        let (scheduler, _) = engine_scheduler(vec![node("a", 64, 512.0, &["cpu"])]);
        let mut tasks = vec![
            Task::new("low", Requirements::standard()).with_priority(1),
            Task::new("urgent", Requirements::standard()).with_priority(9),
            Task::new("normal-1", Requirements::standard()).with_priority(5),
            Task::new("normal-2", Requirements::standard()).with_priority(5),
        ];

        let results = scheduler.place_by_priority(&mut tasks, None).await;

        assert!(results.iter().all(Result::is_ok));
        let order: Vec<_> = tasks.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(order, vec!["urgent", "normal-1", "normal-2", "low"]);
        assert_eq!(scheduler.scheduled_tasks().await, order);
        assert!(tasks.iter().all(|t| t.assigned_node.as_deref() == Some("a")));
    }

    #[tokio::test]
    async fn replace_weights_rejects_stale_expectation() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        let stale = scheduler.cost_weights().await;
        let concurrent = CostWeights {
            load_factor: 7.0,
            ..CostWeights::default()
        };
        scheduler.set_cost_weights(concurrent.clone()).await;

        let proposal = CostWeights {
            headroom_penalty: 150.0,
            ..stale.clone()
        };
        assert!(!scheduler.replace_cost_weights(&stale, proposal.clone()).await);
        assert_eq!(scheduler.cost_weights().await, concurrent);

        assert!(scheduler.replace_cost_weights(&concurrent, proposal.clone()).await);
        assert_eq!(scheduler.cost_weights().await, proposal);
    }

    #[tokio::test]
    async fn scheduled_tasks_is_a_copy() {
        let scheduler = Scheduler::standalone(SchedulerConfig::default());
        scheduler.schedule_task("a", None, None).await.unwrap();

        let mut tasks = scheduler.scheduled_tasks().await;
        tasks.push("forged".to_string());

        assert_eq!(scheduler.scheduled_tasks().await, vec!["a"]);
    }
}
