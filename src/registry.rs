//! Plugin name to factory table.

use std::collections::BTreeMap;
use std::sync::Arc;
use crate::default_scheduler_plugins::{context_aware, resource_allocation};
use crate::error::{SchedulerError, SchedulerResult};
use crate::scheduler_plugin::{Handle, Plugin};

/// Builds a plugin from its raw arguments. `None` means no arguments were configured.
pub type PluginFactory = fn(Option<&serde_json::Value>, Arc<dyn Handle>) -> SchedulerResult<Box<dyn Plugin>>;

#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<String, PluginFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registry with all in-tree plugins.
    pub fn in_tree() -> Self {
        let mut registry = Self::new();
        for (name, factory) in [
            (context_aware::NAME, context_aware::factory as PluginFactory),
            (resource_allocation::NAME, resource_allocation::factory as PluginFactory),
        ] {
            registry.factories.insert(name.to_string(), factory);
        }
        registry
    }

    pub fn register(&mut self, name: &str, factory: PluginFactory) -> SchedulerResult<()> {
        if self.factories.contains_key(name) {
            return Err(SchedulerError::DuplicatePlugin(name.to_string()));
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn build(&self, name: &str, args: Option<&serde_json::Value>,
                 handle: Arc<dyn Handle>) -> SchedulerResult<Box<dyn Plugin>> {
        let factory = self.factories.get(name)
            .ok_or_else(|| SchedulerError::UnknownPlugin(name.to_string()))?;
        factory(args, handle)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
