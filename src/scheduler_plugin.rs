//! Extension points a scheduler plugin can implement.
//!
//! A plugin is constructed once at scheduler startup and then shared by every
//! scheduling cycle, so all extension points take `&self` and implementations
//! must be safe to call from several threads at once. Per-cycle data lives in
//! the [`CycleState`] passed into each call, never in the plugin itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::cycle_state::CycleState;
use crate::events::ClusterEvent;
use crate::node::NodeInfo;
use crate::pod::Pod;
use crate::status::Status;

/// Lowest score a Score plugin may return.
pub const MIN_NODE_SCORE: i64 = 0;
/// Highest score a Score plugin may return.
pub const MAX_NODE_SCORE: i64 = 100;

/// Host services available to plugins.
pub trait Handle: Send + Sync {
    /// Node as seen by the current cycle's snapshot.
    fn node_info(&self, node_name: &str) -> Option<Arc<NodeInfo>>;

    fn node_names(&self) -> Vec<String>;
}

/// Per-cycle call context. Cloning shares the cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CycleContext {
    cancelled: Arc<AtomicBool>,
}

impl CycleContext {
    pub fn new() -> Self {
        Default::default()
    }

    /// Asks every holder of this context to stop work for the cycle.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

pub trait Plugin: Send + Sync {
    /// Name used in the plugin registry, configuration and logs.
    fn name(&self) -> &str;

    fn as_pre_score(&self) -> Option<&dyn PreScorePlugin> {
        None
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        None
    }

    fn as_enqueue_extensions(&self) -> Option<&dyn EnqueueExtensions> {
        None
    }
}

/// Runs once per cycle before any Score call of the same cycle.
/// A non-success status aborts the cycle.
pub trait PreScorePlugin: Plugin {
    fn pre_score(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
                 nodes: &[Arc<NodeInfo>]) -> Status;
}

/// Runs once per candidate node, possibly in parallel for different nodes.
/// `Err` fails the given node only.
pub trait ScorePlugin: Plugin {
    fn score(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
             node_name: &str) -> Result<i64, Status>;

    /// Optional normalization step, `None` keeps raw scores.
    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

pub trait ScoreExtensions: Send + Sync {
    fn normalize_score(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
                       scores: &mut [NodeScore]) -> Status;
}

/// Declares events after which pods rejected by this plugin are worth retrying.
pub trait EnqueueExtensions {
    fn events_to_register(&self) -> Vec<ClusterEvent>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeScore {
    pub name: String,
    pub score: i64,
}
