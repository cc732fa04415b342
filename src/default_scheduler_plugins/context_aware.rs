//! Scores nodes against placement constraints carried in pod labels.
//!
//! PreScore extracts the constraints once per cycle and caches them in the
//! cycle state, Score reads them back for every candidate node.

use std::any::Any;
use std::sync::Arc;
use log::{debug, info, warn};
use serde::Deserialize;
use crate::constraints::{extract_constraints, Constraints};
use crate::cycle_state::{CycleState, StateData};
use crate::error::{SchedulerError, SchedulerResult};
use crate::events::{ClusterEvent, NODE_ADD};
use crate::node::NodeInfo;
use crate::pod::Pod;
use crate::scheduler_plugin::{CycleContext, EnqueueExtensions, Handle, Plugin, PreScorePlugin,
                              ScoreExtensions, ScorePlugin, MAX_NODE_SCORE, MIN_NODE_SCORE};
use crate::scoring_policy::{ScoringPolicy, StaticScorePolicy};
use crate::status::Status;

pub const NAME: &str = "ContextAware";
pub const PRE_SCORE_STATE_KEY: &str = "PreScoreContextAware";

/// Plugin arguments.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ContextAwareArgs {
    /// Only labels starting with this prefix are constraints, empty means all.
    #[serde(rename = "labelPrefix", default)]
    pub label_prefix: String,
}

/// Computed at PreScore and used at Score.
///
/// Never mutated after being written, so clones share the constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct PreScoreState {
    constraints: Arc<Constraints>,
}

impl PreScoreState {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints: Arc::new(constraints),
        }
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }
}

impl StateData for PreScoreState {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ContextAware {
    label_prefix: String,
    policy: Box<dyn ScoringPolicy>,
    handle: Arc<dyn Handle>,
}

impl ContextAware {
    /// Builds the plugin from raw arguments, default arguments when `args` is `None`.
    pub fn new(args: Option<&serde_json::Value>, handle: Arc<dyn Handle>) -> SchedulerResult<Self> {
        Self::with_policy(args, handle, Box::new(StaticScorePolicy::default()))
    }

    pub fn with_policy(args: Option<&serde_json::Value>, handle: Arc<dyn Handle>,
                       policy: Box<dyn ScoringPolicy>) -> SchedulerResult<Self> {
        let mut typed_args = ContextAwareArgs::default();
        if let Some(args) = args {
            typed_args = ContextAwareArgs::deserialize(args)
                .map_err(|source| SchedulerError::DecodeArgs { plugin: NAME.to_string(), source })?;
            info!("ContextAwareArgs is successfully applied");
        }
        Ok(Self {
            label_prefix: typed_args.label_prefix,
            policy,
            handle,
        })
    }

    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    /// Constraints of `pod` under the configured prefix.
    pub fn extract(&self, pod: &Pod) -> Constraints {
        extract_constraints(&pod.labels, &self.label_prefix)
    }
}

/// Registry entry point.
pub fn factory(args: Option<&serde_json::Value>, handle: Arc<dyn Handle>) -> SchedulerResult<Box<dyn Plugin>> {
    Ok(Box::new(ContextAware::new(args, handle)?))
}

impl Plugin for ContextAware {
    fn name(&self) -> &str {
        NAME
    }

    fn as_pre_score(&self) -> Option<&dyn PreScorePlugin> {
        Some(self)
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        Some(self)
    }

    fn as_enqueue_extensions(&self) -> Option<&dyn EnqueueExtensions> {
        Some(self)
    }
}

impl PreScorePlugin for ContextAware {
    fn pre_score(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
                 _nodes: &[Arc<NodeInfo>]) -> Status {
        if ctx.is_cancelled() {
            return Status::as_status(&SchedulerError::Cancelled).with_plugin(NAME);
        }
        info!("execute PreScore on ContextAware plugin, pod={}", pod.key());

        let constraints = self.extract(pod);
        debug!("constraints read for pod={}: {:?}", pod.key(), constraints);

        state.write(PRE_SCORE_STATE_KEY, PreScoreState::new(constraints));
        Status::success()
    }
}

impl ScorePlugin for ContextAware {
    fn score(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
             node_name: &str) -> Result<i64, Status> {
        if ctx.is_cancelled() {
            return Err(Status::as_status(&SchedulerError::Cancelled).with_plugin(NAME));
        }
        debug!("execute Score on ContextAware plugin, pod={}, node={}", pod.key(), node_name);

        let pre_score_state = match state.read_as::<PreScoreState>(PRE_SCORE_STATE_KEY) {
            Ok(pre_score_state) => pre_score_state,
            // Nothing cached for this cycle: no opinion about the node.
            Err(SchedulerError::StateNotFound(_)) => return Ok(0),
            Err(err) => {
                warn!("pod={}, node={}: {}", pod.key(), node_name, err);
                return Err(Status::as_status(&err).with_plugin(NAME));
            }
        };

        let node = self.handle.node_info(node_name);
        match self.policy.score(pre_score_state.constraints(), node_name, node.as_deref()) {
            Ok(score) => Ok(score.clamp(MIN_NODE_SCORE, MAX_NODE_SCORE)),
            Err(err) => {
                warn!("pod={}, node={}: {}", pod.key(), node_name, err);
                Err(Status::as_status(&err).with_plugin(NAME))
            }
        }
    }

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

impl EnqueueExtensions for ContextAware {
    fn events_to_register(&self) -> Vec<ClusterEvent> {
        vec![NODE_ADD]
    }
}
