//! Scores nodes by how full they would be after placing the pod.

use std::sync::Arc;
use serde::Deserialize;
use crate::cycle_state::CycleState;
use crate::error::{SchedulerError, SchedulerResult};
use crate::node::NodeInfo;
use crate::pod::Pod;
use crate::scheduler_plugin::{CycleContext, Handle, Plugin, ScorePlugin, MAX_NODE_SCORE};
use crate::status::Status;

pub const NAME: &str = "ResourceAllocation";

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub enum ScoringStrategy {
    /// Prefer the most loaded nodes (bin packing).
    #[default]
    MostAllocated,
    /// Prefer the least loaded nodes (spreading).
    LeastAllocated,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ResourceAllocationArgs {
    #[serde(default)]
    pub strategy: ScoringStrategy,
}

pub struct ResourceAllocation {
    strategy: ScoringStrategy,
    handle: Arc<dyn Handle>,
}

impl ResourceAllocation {
    pub fn new(args: Option<&serde_json::Value>, handle: Arc<dyn Handle>) -> SchedulerResult<Self> {
        let typed_args = match args {
            Some(args) => ResourceAllocationArgs::deserialize(args)
                .map_err(|source| SchedulerError::DecodeArgs { plugin: NAME.to_string(), source })?,
            None => ResourceAllocationArgs::default(),
        };
        Ok(Self {
            strategy: typed_args.strategy,
            handle,
        })
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    fn node_score(&self, pod: &Pod, node: &NodeInfo) -> i64 {
        let cpu_utilization = node.cpu_utilization_with(pod.requested_cpu).min(1.0);
        let memory_utilization = node.memory_utilization_with(pod.requested_memory).min(1.0);
        let utilization = (cpu_utilization + memory_utilization) / 2.0;
        let fraction = match self.strategy {
            ScoringStrategy::MostAllocated => utilization,
            ScoringStrategy::LeastAllocated => 1.0 - utilization,
        };
        (fraction * MAX_NODE_SCORE as f64).round() as i64
    }
}

pub fn factory(args: Option<&serde_json::Value>, handle: Arc<dyn Handle>) -> SchedulerResult<Box<dyn Plugin>> {
    Ok(Box::new(ResourceAllocation::new(args, handle)?))
}

impl Plugin for ResourceAllocation {
    fn name(&self) -> &str {
        NAME
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        Some(self)
    }
}

impl ScorePlugin for ResourceAllocation {
    fn score(&self, ctx: &CycleContext, _state: &CycleState, pod: &Pod,
             node_name: &str) -> Result<i64, Status> {
        if ctx.is_cancelled() {
            return Err(Status::as_status(&SchedulerError::Cancelled).with_plugin(NAME));
        }
        let node = self.handle.node_info(node_name).ok_or_else(|| {
            Status::as_status(&SchedulerError::NodeNotFound(node_name.to_string())).with_plugin(NAME)
        })?;
        Ok(self.node_score(pod, &node).max(0))
    }
}
