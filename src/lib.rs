//! Context-aware node scoring for a k8s-style pod scheduler.

pub mod constraints;
pub mod cycle_state;
pub mod default_scheduler_plugins;
pub mod error;
pub mod events;
pub mod framework;
pub mod logger;
pub mod node;
pub mod pod;
pub mod registry;
pub mod scheduler;
pub mod scheduler_config;
pub mod scheduler_plugin;
pub mod scheduling_queue;
pub mod scoring_policy;
pub mod snapshot;
pub mod status;
