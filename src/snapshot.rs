//! Immutable view of the cluster nodes taken at the start of a scheduling cycle.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use crate::node::NodeInfo;
use crate::scheduler_plugin::Handle;

#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    nodes: BTreeMap<String, Arc<NodeInfo>>,
}

impl Snapshot {
    pub fn new(nodes: impl IntoIterator<Item = NodeInfo>) -> Self {
        Self {
            nodes: nodes.into_iter()
                .map(|node| (node.name.clone(), Arc::new(node)))
                .collect(),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Arc<NodeInfo>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Handle for Snapshot {
    fn node_info(&self, node_name: &str) -> Option<Arc<NodeInfo>> {
        self.nodes.get(node_name).cloned()
    }

    fn node_names(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }
}

/// Snapshot slot shared by the host and every plugin handle. The scheduler
/// swaps in a fresh snapshot before each cycle.
#[derive(Debug, Default)]
pub struct SharedSnapshot {
    current: RwLock<Arc<Snapshot>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn update(&self, snapshot: Snapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    pub fn get(&self) -> Arc<Snapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Handle for SharedSnapshot {
    fn node_info(&self, node_name: &str) -> Option<Arc<NodeInfo>> {
        self.get().node_info(node_name)
    }

    fn node_names(&self) -> Vec<String> {
        self.get().node_names()
    }
}
