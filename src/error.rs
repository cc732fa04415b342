//! Scheduler error types.

use thiserror::Error;
use crate::scheduler_config::{MAX_PLUGIN_WEIGHT, MIN_PLUGIN_WEIGHT};

/// Errors produced by plugins, the framework and configuration loading.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("decode arg into {plugin}Args: {source}")]
    DecodeArgs {
        plugin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("state not found for key {0:?}")]
    StateNotFound(String),

    #[error("unexpected pre-score state type under key {key:?}: found {found}")]
    UnexpectedStateType { key: String, found: &'static str },

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("plugin registered twice: {0}")]
    DuplicatePlugin(String),

    #[error("plugin {plugin} has weight {weight}, it should be in the range of [{min}, {max}]",
            min = MIN_PLUGIN_WEIGHT, max = MAX_PLUGIN_WEIGHT)]
    InvalidWeight { plugin: String, weight: i64 },

    #[error("weighted score of node {0:?} overflows")]
    ScoreOverflow(String),

    #[error("node {0:?} not found in snapshot")]
    NodeNotFound(String),

    #[error("scheduling cycle cancelled")]
    Cancelled,

    #[error("can't build scoring thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("can't read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse YAML from file {path}: {source}")]
    ParseConfig {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
