//! Scheduler configuration.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::default_scheduler_plugins::context_aware;
use crate::error::{SchedulerError, SchedulerResult};

pub const DEFAULT_PARALLELISM: usize = 16;
pub const MIN_PLUGIN_WEIGHT: i64 = 1;
pub const MAX_PLUGIN_WEIGHT: i64 = 100;

/// Holds configuration of an enabled plugin.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Name in the plugin registry.
    pub name: String,
    /// Multiplier applied to the plugin's node scores.
    #[serde(default = "default_weight")]
    pub weight: i64,
    /// Raw plugin arguments, decoded by the plugin itself.
    #[serde(default)]
    pub args: Option<serde_json::Value>,
}

fn default_weight() -> i64 {
    1
}

impl PluginConfig {
    pub fn new(name: &str, weight: i64, args: Option<serde_json::Value>) -> Self {
        Self {
            name: name.to_string(),
            weight,
            args,
        }
    }

    /// Rejects weights outside `MIN_PLUGIN_WEIGHT..=MAX_PLUGIN_WEIGHT`.
    pub fn validate(&self) -> SchedulerResult<()> {
        if !(MIN_PLUGIN_WEIGHT..=MAX_PLUGIN_WEIGHT).contains(&self.weight) {
            return Err(SchedulerError::InvalidWeight { plugin: self.name.clone(), weight: self.weight });
        }
        Ok(())
    }
}

/// Holds configuration of a single node or a set of identical nodes.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node names are `{name_prefix}-{index}`.
    pub name_prefix: String,
    /// Node CPU capacity.
    pub cpu: u32,
    /// Node memory capacity in GB.
    pub memory: u64,
    /// Number of such nodes.
    pub count: u32,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Holds configuration of a single pod or a set of identical pods.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PodConfig {
    /// Pod names are `{name_prefix}-{index}`.
    pub name_prefix: String,
    /// Minimum CPU capacity.
    pub requested_cpu: f32,
    /// Minimum memory capacity in GB.
    pub requested_memory: f64,
    /// Priority weight of k8s pod (for a scheduler).
    #[serde(default)]
    pub priority_weight: u64,
    /// Number of such pods.
    pub count: u32,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Holds raw scheduler config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSchedulerConfig {
    pub parallelism: Option<usize>,
    pub plugins: Option<Vec<PluginConfig>>,
    pub nodes: Option<Vec<NodeConfig>>,
    pub pods: Option<Vec<PodConfig>>,
}

/// Represents scheduler configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of threads used to score nodes.
    pub parallelism: usize,
    /// Enabled plugins in the order they run.
    pub plugins: Vec<PluginConfig>,
    /// Configurations of nodes.
    pub nodes: Vec<NodeConfig>,
    /// Configurations of pods to schedule.
    pub pods: Vec<PodConfig>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            plugins: Self::default_plugins(),
            nodes: Vec::default(),
            pods: Vec::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn default_plugins() -> Vec<PluginConfig> {
        vec![PluginConfig::new(context_aware::NAME, 1, None)]
    }

    /// Parses YAML content, `origin` is only used in error messages.
    pub fn from_yaml(content: &str, origin: &str) -> SchedulerResult<Self> {
        let raw: RawSchedulerConfig = serde_yaml::from_str(content)
            .map_err(|source| SchedulerError::ParseConfig { path: origin.to_string(), source })?;

        let plugins = raw.plugins.unwrap_or_else(Self::default_plugins);
        for plugin in &plugins {
            plugin.validate()?;
        }

        Ok(Self {
            parallelism: raw.parallelism.unwrap_or(DEFAULT_PARALLELISM).max(1),
            plugins,
            nodes: raw.nodes.unwrap_or_default(),
            pods: raw.pods.unwrap_or_default(),
        })
    }

    pub fn from_file(file_name: &str) -> SchedulerResult<Self> {
        let content = std::fs::read_to_string(file_name)
            .map_err(|source| SchedulerError::Io { path: file_name.to_string(), source })?;
        Self::from_yaml(&content, file_name)
    }
}
