//! One scheduling cycle per pod: filter, PreScore, Score, pick the best node.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use log::{info, warn};
use crate::cycle_state::CycleState;
use crate::error::SchedulerResult;
use crate::events::{ClusterEvent, NODE_ADD, NODE_LABEL_CHANGE};
use crate::framework::{Framework, NodePluginScores};
use crate::node::NodeInfo;
use crate::pod::{Pod, PodStatus};
use crate::registry::Registry;
use crate::scheduler_config::SchedulerConfig;
use crate::scheduler_plugin::{CycleContext, Handle};
use crate::scheduling_queue::SchedulingQueue;
use crate::snapshot::{SharedSnapshot, Snapshot};
use crate::status::{Code, Status};

/// Node chosen for a pod in one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleResult {
    pub suggested_host: String,
    pub score: i64,
    pub evaluated_nodes: usize,
    pub feasible_nodes: usize,
}

/// Why a cycle did not produce a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleFailure {
    pub status: Status,
    /// Plugins responsible for the failure, empty if no plugin is to blame.
    pub rejected_by: BTreeSet<String>,
}

impl ScheduleFailure {
    fn new(status: Status) -> Self {
        let rejected_by = status.plugin().map(|plugin| plugin.to_string()).into_iter().collect();
        Self { status, rejected_by }
    }
}

/// Outcome of scheduling one pod taken from the queue.
#[derive(Clone, Debug)]
pub struct ScheduleAttempt {
    pub pod: Pod,
    pub result: Result<ScheduleResult, ScheduleFailure>,
}

pub struct Scheduler {
    framework: Framework,
    snapshot: Arc<SharedSnapshot>,
    nodes: BTreeMap<String, NodeInfo>,
    pub queue: SchedulingQueue,
    pod_to_node_map: BTreeMap<u64, String>,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig, registry: &Registry) -> SchedulerResult<Self> {
        let snapshot = Arc::new(SharedSnapshot::default());
        let handle: Arc<dyn Handle> = snapshot.clone();
        let framework = Framework::new(registry, &config.plugins, handle, config.parallelism)?;
        let queue = SchedulingQueue::new(framework.cluster_events());
        info!("scheduler started with plugins {:?}", framework.plugin_names());
        Ok(Self {
            framework,
            snapshot,
            nodes: BTreeMap::default(),
            queue,
            pod_to_node_map: BTreeMap::default(),
        })
    }

    pub fn framework(&self) -> &Framework {
        &self.framework
    }

    /// Add new node to the cluster, unschedulable pods interested in it are retried.
    pub fn add_node(&mut self, node: NodeInfo) {
        self.nodes.insert(node.name.clone(), node);
        self.on_cluster_event(&NODE_ADD);
    }

    pub fn update_node_labels(&mut self, node_name: &str, labels: BTreeMap<String, String>) -> bool {
        match self.nodes.get_mut(node_name) {
            Some(node) => {
                node.labels = labels;
                self.on_cluster_event(&NODE_LABEL_CHANGE);
                true
            }
            None => false,
        }
    }

    pub fn node(&self, node_name: &str) -> Option<&NodeInfo> {
        self.nodes.get(node_name)
    }

    pub fn add_pod(&mut self, pod: Pod) {
        self.queue.add(pod);
    }

    /// Node the pod was bound to, if any.
    pub fn assigned_node(&self, pod_uid: u64) -> Option<&str> {
        self.pod_to_node_map.get(&pod_uid).map(String::as_str)
    }

    pub fn on_cluster_event(&mut self, event: &ClusterEvent) -> usize {
        self.queue.move_all_to_active_queue(event)
    }

    /// Publishes the current nodes to plugin handles and returns the snapshot.
    pub fn update_snapshot(&self) -> Snapshot {
        let snapshot = Snapshot::new(self.nodes.values().cloned());
        self.snapshot.update(snapshot.clone());
        snapshot
    }

    /// Runs one scheduling cycle for `pod` against the current nodes.
    /// Does not change any cluster state.
    pub fn schedule_pod(&self, ctx: &CycleContext, pod: &Pod) -> Result<ScheduleResult, ScheduleFailure> {
        let snapshot = self.update_snapshot();
        let evaluated_nodes = snapshot.len();

        let feasible_nodes: Vec<Arc<NodeInfo>> = snapshot.nodes()
            .filter(|node| node.can_place_pod(pod.requested_cpu, pod.requested_memory))
            .cloned()
            .collect();
        if feasible_nodes.is_empty() {
            return Err(ScheduleFailure::new(Status::new(Code::Unschedulable, format!(
                "0/{} nodes are available: insufficient resources", evaluated_nodes))));
        }

        let state = CycleState::new();
        let status = self.framework.run_pre_score_plugins(ctx, &state, pod, &feasible_nodes);
        if !status.is_success() {
            return Err(ScheduleFailure::new(status));
        }

        let outcome = self.framework.run_score_plugins(ctx, &state, pod, &feasible_nodes)
            .map_err(ScheduleFailure::new)?;

        let mut best: Option<&NodePluginScores> = None;
        for node_scores in &outcome.scored {
            if best.map_or(true, |current| node_scores.total_score > current.total_score) {
                best = Some(node_scores);
            }
        }

        match best {
            Some(best) => Ok(ScheduleResult {
                suggested_host: best.name.clone(),
                score: best.total_score,
                evaluated_nodes,
                feasible_nodes: feasible_nodes.len(),
            }),
            None => {
                let rejected_by = outcome.failed.iter()
                    .filter_map(|failure| failure.status.plugin().map(str::to_string))
                    .collect();
                let reasons = outcome.failed.iter()
                    .map(|failure| format!("{}: {}", failure.name, failure.status.message()))
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(ScheduleFailure {
                    status: Status::new(Code::Unschedulable, format!(
                        "0/{} nodes are available: {}", evaluated_nodes, reasons)),
                    rejected_by,
                })
            }
        }
    }

    /// Takes the next pod from the queue and schedules it, binding it to the
    /// chosen node or parking it as unschedulable.
    pub fn schedule_one(&mut self, ctx: &CycleContext) -> Option<ScheduleAttempt> {
        let mut pod = self.queue.pop()?;
        pod.scheduling_attempts += 1;

        let result = self.schedule_pod(ctx, &pod);
        match &result {
            Ok(schedule_result) => {
                let bound = self.nodes.get_mut(&schedule_result.suggested_host)
                    .is_some_and(|node| node.allocate(pod.requested_cpu, pod.requested_memory));
                if bound {
                    info!("pod={} assigned to node={} with score {}",
                        pod.key(), schedule_result.suggested_host, schedule_result.score);
                    pod.status = PodStatus::Running;
                    self.pod_to_node_map.insert(pod.uid, schedule_result.suggested_host.clone());
                } else {
                    warn!("pod={} could not be bound to node={}", pod.key(), schedule_result.suggested_host);
                    self.queue.add_unschedulable(pod.clone(), BTreeSet::new());
                }
            }
            Err(failure) => {
                info!("pod={} is unschedulable: {}", pod.key(), failure.status);
                self.queue.add_unschedulable(pod.clone(), failure.rejected_by.clone());
            }
        }
        Some(ScheduleAttempt { pod, result })
    }

    /// Schedules until the active queue is empty.
    pub fn run(&mut self, ctx: &CycleContext) -> Vec<ScheduleAttempt> {
        let mut attempts = Vec::default();
        while let Some(attempt) = self.schedule_one(ctx) {
            attempts.push(attempt);
        }
        attempts
    }
}
