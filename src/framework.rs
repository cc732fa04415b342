//! Runs the PreScore and Score extension points of the enabled plugins.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use log::{debug, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::cycle_state::CycleState;
use crate::error::{SchedulerError, SchedulerResult};
use crate::events::ClusterEvent;
use crate::node::NodeInfo;
use crate::pod::Pod;
use crate::registry::Registry;
use crate::scheduler_config::PluginConfig;
use crate::scheduler_plugin::{CycleContext, Handle, NodeScore, Plugin, ScorePlugin,
                              MAX_NODE_SCORE, MIN_NODE_SCORE};
use crate::status::{Code, Status};

struct EnabledPlugin {
    plugin: Box<dyn Plugin>,
    weight: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginScore {
    pub name: String,
    pub score: i64,
}

/// Scores of every plugin for one node, plus their weighted sum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodePluginScores {
    pub name: String,
    pub scores: Vec<PluginScore>,
    pub total_score: i64,
}

/// A node dropped from the cycle because a plugin failed to score it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeFailure {
    pub name: String,
    pub status: Status,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub scored: Vec<NodePluginScores>,
    pub failed: Vec<NodeFailure>,
}

pub struct Framework {
    plugins: Vec<EnabledPlugin>,
    pool: ThreadPool,
}

impl Framework {
    /// Builds every configured plugin through the registry.
    pub fn new(registry: &Registry, configs: &[PluginConfig], handle: Arc<dyn Handle>,
               parallelism: usize) -> SchedulerResult<Self> {
        let mut seen = BTreeSet::new();
        let mut plugins = Vec::with_capacity(configs.len());
        for config in configs {
            if !seen.insert(config.name.as_str()) {
                return Err(SchedulerError::DuplicatePlugin(config.name.clone()));
            }
            config.validate()?;
            let plugin = registry.build(&config.name, config.args.as_ref(), handle.clone())?;
            plugins.push(EnabledPlugin { plugin, weight: config.weight });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism.max(1))
            .thread_name(|i| format!("score-worker-{}", i))
            .build()?;
        Ok(Self { plugins, pool })
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|entry| entry.plugin.name()).collect()
    }

    /// Events registered by each plugin implementing `EnqueueExtensions`.
    pub fn cluster_events(&self) -> HashMap<String, Vec<ClusterEvent>> {
        self.plugins.iter()
            .filter_map(|entry| entry.plugin.as_enqueue_extensions()
                .map(|ext| (entry.plugin.name().to_string(), ext.events_to_register())))
            .collect()
    }

    /// Runs PreScore of every plugin once. The first non-success, non-skip
    /// status aborts the cycle.
    pub fn run_pre_score_plugins(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
                                 nodes: &[Arc<NodeInfo>]) -> Status {
        for plugin in self.plugins.iter().filter_map(|entry| entry.plugin.as_pre_score()) {
            if ctx.is_cancelled() {
                return Status::as_status(&SchedulerError::Cancelled);
            }
            let status = plugin.pre_score(ctx, state, pod, nodes);
            if status.is_skip() {
                debug!("plugin {} skipped Score for pod={}", plugin.name(), pod.key());
                state.skip_score_plugin(plugin.name());
                continue;
            }
            if !status.is_success() {
                return status.with_plugin(plugin.name());
            }
        }
        Status::success()
    }

    /// Scores every node with every Score plugin, nodes in parallel.
    ///
    /// A plugin failing on a node removes only that node from the outcome.
    /// Normalization works on the surviving nodes and its failure aborts the cycle.
    pub fn run_score_plugins(&self, ctx: &CycleContext, state: &CycleState, pod: &Pod,
                             nodes: &[Arc<NodeInfo>]) -> Result<ScoreOutcome, Status> {
        let active: Vec<(&dyn ScorePlugin, i64)> = self.plugins.iter()
            .filter_map(|entry| entry.plugin.as_score().map(|plugin| (plugin, entry.weight)))
            .filter(|(plugin, _)| !state.is_score_skipped(plugin.name()))
            .collect();

        let per_node: Vec<(String, Result<Vec<i64>, Status>)> = self.pool.install(|| {
            nodes.par_iter()
                .map(|node| (node.name.clone(), score_node(ctx, state, pod, &node.name, &active)))
                .collect()
        });

        let mut outcome = ScoreOutcome::default();
        let mut scored = Vec::with_capacity(per_node.len());
        for (name, result) in per_node {
            match result {
                Ok(scores) => scored.push((name, scores)),
                Err(status) => {
                    warn!("failed to score node={} for pod={}: {}", name, pod.key(), status);
                    outcome.failed.push(NodeFailure { name, status });
                }
            }
        }

        for (index, (plugin, _)) in active.iter().enumerate() {
            let Some(extensions) = plugin.score_extensions() else {
                continue;
            };
            let mut node_scores: Vec<NodeScore> = scored.iter()
                .map(|(name, scores)| NodeScore { name: name.clone(), score: scores[index] })
                .collect();
            let status = extensions.normalize_score(ctx, state, pod, &mut node_scores);
            if !status.is_success() {
                return Err(status.with_plugin(plugin.name()));
            }
            for ((_, scores), node_score) in scored.iter_mut().zip(node_scores) {
                scores[index] = validate_score(plugin.name(), node_score.score)?;
            }
        }

        for (name, scores) in scored {
            match weighted_total(&scores, &active) {
                Some(total_score) => {
                    let scores = scores.into_iter()
                        .zip(active.iter())
                        .map(|(score, (plugin, _))| PluginScore { name: plugin.name().to_string(), score })
                        .collect();
                    outcome.scored.push(NodePluginScores { name, scores, total_score });
                }
                None => {
                    let status = Status::as_status(&SchedulerError::ScoreOverflow(name.clone()));
                    warn!("failed to score node={} for pod={}: {}", name, pod.key(), status);
                    outcome.failed.push(NodeFailure { name, status });
                }
            }
        }
        Ok(outcome)
    }
}

fn score_node(ctx: &CycleContext, state: &CycleState, pod: &Pod, node_name: &str,
              active: &[(&dyn ScorePlugin, i64)]) -> Result<Vec<i64>, Status> {
    if ctx.is_cancelled() {
        return Err(Status::as_status(&SchedulerError::Cancelled));
    }
    active.iter()
        .map(|(plugin, _)| {
            let score = plugin.score(ctx, state, pod, node_name)
                .map_err(|status| status.with_plugin(plugin.name()))?;
            validate_score(plugin.name(), score)
        })
        .collect()
}

fn weighted_total(scores: &[i64], active: &[(&dyn ScorePlugin, i64)]) -> Option<i64> {
    scores.iter()
        .zip(active)
        .try_fold(0i64, |total, (score, (_, weight))| total.checked_add(score.checked_mul(*weight)?))
}

fn validate_score(plugin: &str, score: i64) -> Result<i64, Status> {
    if !(MIN_NODE_SCORE..=MAX_NODE_SCORE).contains(&score) {
        return Err(Status::new(Code::Error, format!(
            "plugin {} returns an invalid score {}, it should in the range of [{}, {}]",
            plugin, score, MIN_NODE_SCORE, MAX_NODE_SCORE,
        )).with_plugin(plugin));
    }
    Ok(score)
}
