//! Minimal constraint expressions for the in-memory placement engine.
//!
//! A constraint is a conjunction of clauses joined by `&&`:
//!
//! ```text
//! device == gpu && memory_gb >= 16 && node != node-3
//! ```
//!
//! Keys: `device`, `memory_gb`, `cpu_count`, `node`. Operators: `==`, `!=`,
//! `>=`, `<=`, `>`, `<`. `device == x` holds when the node advertises `x`.
//! Empty text matches every node.

use std::cmp::Reverse;
use std::fmt;

use shardline_core::Capabilities;

use crate::error::{ClusterError, ClusterResult};

/// Comparison operators. The first one in a clause splits key from value;
/// at the same position the longer symbol wins, so `>=` beats `>`.
const OPERATORS: [(&str, Op); 6] = [
    (">=", Op::Ge),
    ("<=", Op::Le),
    ("==", Op::Eq),
    ("!=", Op::Ne),
    (">", Op::Gt),
    ("<", Op::Lt),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Op {
    fn symbol(&self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Lt => "<",
        }
    }

    fn compare(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Op::Eq => lhs == rhs,
            Op::Ne => lhs != rhs,
            Op::Ge => lhs >= rhs,
            Op::Le => lhs <= rhs,
            Op::Gt => lhs > rhs,
            Op::Lt => lhs < rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Device { op: Op, device: String },
    Node { op: Op, node_id: String },
    MemoryGb { op: Op, value: f64 },
    CpuCount { op: Op, value: f64 },
}

impl Clause {
    fn matches(&self, node_id: &str, caps: &Capabilities) -> bool {
        match self {
            Clause::Device { op: Op::Eq, device } => caps.has_device(device),
            Clause::Device { device, .. } => !caps.has_device(device),
            Clause::Node { op: Op::Eq, node_id: want } => node_id == want,
            Clause::Node { node_id: want, .. } => node_id != want,
            Clause::MemoryGb { op, value } => op.compare(caps.memory_gb(), *value),
            Clause::CpuCount { op, value } => op.compare(f64::from(caps.cpu_count()), *value),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Device { op, device } => write!(f, "device {} {device}", op.symbol()),
            Clause::Node { op, node_id } => write!(f, "node {} {node_id}", op.symbol()),
            Clause::MemoryGb { op, value } => write!(f, "memory_gb {} {value}", op.symbol()),
            Clause::CpuCount { op, value } => write!(f, "cpu_count {} {value}", op.symbol()),
        }
    }
}

/// A parsed conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    /// Constraint matching every node.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> ClusterResult<Self> {
        let invalid = |reason: String| ClusterError::InvalidConstraint {
            text: text.to_string(),
            reason,
        };

        if text.trim().is_empty() {
            return Ok(Self::any());
        }

        let mut clauses = Vec::new();
        for raw in text.split("&&") {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(invalid("empty clause".to_string()));
            }

            let (pos, symbol, op) = OPERATORS
                .iter()
                .filter_map(|(symbol, op)| raw.find(symbol).map(|pos| (pos, *symbol, *op)))
                .min_by_key(|(pos, symbol, _)| (*pos, Reverse(symbol.len())))
                .ok_or_else(|| invalid(format!("no operator in `{raw}`")))?;

            let key = raw[..pos].trim();
            let value = raw[pos + symbol.len()..]
                .trim()
                .trim_matches(|c| c == '"' || c == '\'');
            if value.is_empty() {
                return Err(invalid(format!("missing value in `{raw}`")));
            }

            let equality_only = |key: &str| {
                if matches!(op, Op::Eq | Op::Ne) {
                    Ok(())
                } else {
                    Err(invalid(format!("`{key}` supports only == and !=")))
                }
            };
            let number = |value: &str| {
                value
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("`{value}` is not a number")))
            };

            let clause = match key {
                "device" => {
                    equality_only(key)?;
                    Clause::Device { op, device: value.to_string() }
                }
                "node" | "node_id" => {
                    equality_only(key)?;
                    Clause::Node { op, node_id: value.to_string() }
                }
                "memory_gb" => Clause::MemoryGb { op, value: number(value)? },
                "cpu_count" => Clause::CpuCount { op, value: number(value)? },
                other => return Err(invalid(format!("unknown key `{other}`"))),
            };
            clauses.push(clause);
        }

        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, node_id: &str, caps: &Capabilities) -> bool {
        self.clauses.iter().all(|c| c.matches(node_id, caps))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "*");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}
