//! Scoring formulas used by the context-aware plugin.

use crate::constraints::Constraints;
use crate::error::{SchedulerError, SchedulerResult};
use crate::node::NodeInfo;
use crate::scheduler_plugin::{MAX_NODE_SCORE, MIN_NODE_SCORE};

/// Maps the constraints of a pod and a candidate node to a score.
///
/// `node` is `None` when the node is missing from the snapshot; only policies
/// that look at the node should fail on it. Implementations must be
/// deterministic, must not decrease when the node fits the constraints better,
/// and should stay within `MIN_NODE_SCORE..=MAX_NODE_SCORE`. The plugin clamps
/// anything outside.
pub trait ScoringPolicy: Send + Sync {
    fn score(&self, constraints: &Constraints, node_name: &str,
             node: Option<&NodeInfo>) -> SchedulerResult<i64>;
}

/// Same score for every node.
#[derive(Clone, Copy, Debug)]
pub struct StaticScorePolicy {
    score: i64,
}

impl StaticScorePolicy {
    pub const DEFAULT_SCORE: i64 = 33;

    pub fn new(score: i64) -> Self {
        Self { score }
    }
}

impl Default for StaticScorePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCORE)
    }
}

impl ScoringPolicy for StaticScorePolicy {
    fn score(&self, _constraints: &Constraints, _node_name: &str,
             _node: Option<&NodeInfo>) -> SchedulerResult<i64> {
        Ok(self.score)
    }
}

/// Share of constraints satisfied by the node labels, scaled to `MAX_NODE_SCORE`.
#[derive(Clone, Copy, Debug)]
pub struct LabelMatchPolicy {
    /// Score for pods without constraints.
    baseline: i64,
}

impl LabelMatchPolicy {
    pub fn new(baseline: i64) -> Self {
        Self { baseline }
    }
}

impl ScoringPolicy for LabelMatchPolicy {
    fn score(&self, constraints: &Constraints, node_name: &str,
             node: Option<&NodeInfo>) -> SchedulerResult<i64> {
        if constraints.is_empty() {
            return Ok(self.baseline);
        }
        let node = node.ok_or_else(|| SchedulerError::NodeNotFound(node_name.to_string()))?;
        let matched = constraints.iter()
            .filter(|(key, value)| node.labels.get(*key) == Some(*value))
            .count() as i64;
        Ok(MIN_NODE_SCORE + (MAX_NODE_SCORE - MIN_NODE_SCORE) * matched / constraints.len() as i64)
    }
}
