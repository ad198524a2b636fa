//! Domain types shared across Shardline crates.
//!
//! Tasks, resource requirements, and the read-only node view handed to the
//! scheduler by its collaborators. Every type serializes to JSON so the
//! surrounding service can move it over the wire.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique identifier for a task within a scheduling session.
pub type TaskId = String;

/// Unique identifier for a node in the fleet.
pub type NodeId = String;

// ── Requirements ───────────────────────────────────────────────────

/// Resource requirements for a task or shard.
///
/// Every field is optional. Consumers default missing values instead of
/// rejecting the requirement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Requirements {
    /// Memory needed, in gigabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<f64>,
    /// CPU cores needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    /// Preferred device class ("cpu", "gpu", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Abstract work size; drives sharding and simulated load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl Requirements {
    /// The requirements assumed when a caller supplies none:
    /// 1 GB, 1 core, cpu, size 1.
    pub fn standard() -> Self {
        Self {
            memory_gb: Some(1.0),
            cpu_cores: Some(1),
            device: Some("cpu".to_string()),
            size: Some(1.0),
        }
    }

    /// Memory in GB. Missing, negative or non-finite values read as 0.
    pub fn memory_gb(&self) -> f64 {
        self.memory_gb
            .filter(|m| m.is_finite() && *m >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn cpu_cores(&self) -> u32 {
        self.cpu_cores.unwrap_or(1)
    }

    /// Work size. Missing, non-positive or non-finite values read as 1.
    pub fn size(&self) -> f64 {
        self.size.filter(|s| s.is_finite() && *s > 0.0).unwrap_or(1.0)
    }

    pub fn with_memory_gb(mut self, memory_gb: f64) -> Self {
        self.memory_gb = Some(memory_gb);
        self
    }

    pub fn with_cpu_cores(mut self, cpu_cores: u32) -> Self {
        self.cpu_cores = Some(cpu_cores);
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }
}

// ── Task ───────────────────────────────────────────────────────────

/// Lifecycle status of a task.
///
/// Only the execution engine moves a task between these states; the
/// scheduler reads them but never changes them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    Retrying,
    Timeout,
    Migrating,
}

/// A unit of work submitted for placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub task_id: TaskId,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub status: TaskStatus,
    /// Node chosen at placement time (first shard's node for sharded tasks).
    #[serde(default)]
    pub assigned_node: Option<NodeId>,
    /// Unix timestamp (seconds) when the task was created.
    pub created_at: u64,
    /// Unix timestamp (seconds) of the last change.
    pub updated_at: u64,
}

impl Task {
    /// Create a pending task with the given requirements.
    pub fn new(task_id: impl Into<String>, requirements: Requirements) -> Self {
        let now = epoch_secs();
        Self {
            task_id: task_id.into(),
            requirements,
            priority: 0,
            status: TaskStatus::Pending,
            assigned_node: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Record the placement decision on the task.
    pub fn assign(&mut self, node_id: impl Into<String>) {
        self.assigned_node = Some(node_id.into());
        self.updated_at = epoch_secs();
    }
}

// ── Node ───────────────────────────────────────────────────────────

/// Advertised capabilities of a node. `{}` means "nothing advertised".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
}

impl Capabilities {
    pub fn new(cpu_count: u32, memory_gb: f64, devices: &[&str]) -> Self {
        Self {
            cpu_count: Some(cpu_count),
            memory_gb: Some(memory_gb),
            devices: devices.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn cpu_count(&self) -> u32 {
        self.cpu_count.unwrap_or(1)
    }

    /// Advertised memory. Missing, negative or non-finite values read as 0.
    pub fn memory_gb(&self) -> f64 {
        self.memory_gb
            .filter(|m| m.is_finite() && *m >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn has_device(&self, device: &str) -> bool {
        self.devices.iter().any(|d| d == device)
    }
}

/// Membership status of a node as reported by the cluster.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Active,
    Inactive,
    Overloaded,
    Offline,
    Maintenance,
    Joining,
    Leaving,
    Unknown,
}

impl NodeStatus {
    /// Whether new work may be placed on a node in this state.
    ///
    /// Overloaded nodes stay eligible; the cost model penalises them.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, NodeStatus::Active | NodeStatus::Overloaded)
    }
}

/// Read-only view of a node supplied by a collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub node_id: NodeId,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub status: NodeStatus,
    /// Reported load percentage, 0..=100.
    #[serde(default)]
    pub load: f64,
}

impl Node {
    pub fn new(node_id: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            node_id: node_id.into(),
            capabilities,
            status: NodeStatus::Active,
            load: 0.0,
        }
    }
}

/// Current Unix epoch in seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current Unix epoch in milliseconds.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_accessors_default_missing_fields() {
        let req = Requirements::default();
        assert_eq!(req.memory_gb(), 0.0);
        assert_eq!(req.cpu_cores(), 1);
        assert_eq!(req.size(), 1.0);
        assert!(req.device.is_none());
    }

    #[test]
    fn malformed_requirement_fields_read_as_defaults() {
        for bad in [-5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let req = Requirements::default().with_memory_gb(bad).with_size(bad);
            assert_eq!(req.memory_gb(), 0.0, "memory_gb {bad}");
            assert_eq!(req.size(), 1.0, "size {bad}");
        }
        assert_eq!(Requirements::default().with_size(0.0).size(), 1.0);
        assert_eq!(Requirements::default().with_memory_gb(0.0).memory_gb(), 0.0);
        assert_eq!(Requirements::default().with_size(2.5).size(), 2.5);
    }

    #[test]
    fn malformed_capability_memory_reads_as_zero() {
        let mut caps = Capabilities::new(4, -8.0, &["cpu"]);
        assert_eq!(caps.memory_gb(), 0.0);
        caps.memory_gb = Some(f64::NAN);
        assert_eq!(caps.memory_gb(), 0.0);
        caps.memory_gb = Some(16.0);
        assert_eq!(caps.memory_gb(), 16.0);
    }

    #[test]
    fn standard_requirements() {
        let req = Requirements::standard();
        assert_eq!(req.memory_gb, Some(1.0));
        assert_eq!(req.cpu_cores, Some(1));
        assert_eq!(req.device.as_deref(), Some("cpu"));
        assert_eq!(req.size, Some(1.0));
    }

    #[test]
    fn requirements_parse_from_partial_json() {
        let req: Requirements = serde_json::from_str(r#"{"size": 20}"#).unwrap();
        assert_eq!(req.size, Some(20.0));
        assert!(req.memory_gb.is_none());
    }

    #[test]
    fn empty_capabilities_default() {
        let caps: Capabilities = serde_json::from_str("{}").unwrap();
        assert_eq!(caps.cpu_count(), 1);
        assert_eq!(caps.memory_gb(), 0.0);
        assert!(!caps.has_device("cpu"));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::Migrating).unwrap();
        assert_eq!(json, "\"migrating\"");
        let status: NodeStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, NodeStatus::Maintenance);
    }

    #[test]
    fn schedulable_statuses() {
        assert!(NodeStatus::Active.is_schedulable());
        assert!(NodeStatus::Overloaded.is_schedulable());
        assert!(!NodeStatus::Offline.is_schedulable());
        assert!(!NodeStatus::Maintenance.is_schedulable());
        assert!(!NodeStatus::Leaving.is_schedulable());
    }

    #[test]
    fn assign_sets_node_and_timestamp() {
        let mut task = Task::new("t1", Requirements::standard());
        task.updated_at = 0;
        task.assign("node-a");
        assert_eq!(task.assigned_node.as_deref(), Some("node-a"));
        assert!(task.updated_at > 0);
        assert_eq!(task.status, TaskStatus::Pending);
    }
}
