//! Cluster events that can make an unschedulable pod schedulable again.

use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Pod,
    Node,
    /// Any resource kind.
    WildCard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionType {
    Add,
    Delete,
    UpdateNodeLabel,
    UpdateNodeAllocatable,
    /// Any action.
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClusterEvent {
    pub resource: Resource,
    pub action_type: ActionType,
}

impl ClusterEvent {
    pub const fn new(resource: Resource, action_type: ActionType) -> Self {
        Self { resource, action_type }
    }

    /// Whether an incoming event is covered by this registration.
    pub fn matches(&self, incoming: &ClusterEvent) -> bool {
        let resource_matches = self.resource == Resource::WildCard || self.resource == incoming.resource;
        let action_matches = self.action_type == ActionType::All || self.action_type == incoming.action_type;
        resource_matches && action_matches
    }
}

impl Display for ClusterEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:?}{:?}", self.resource, self.action_type)
    }
}

pub const NODE_ADD: ClusterEvent = ClusterEvent::new(Resource::Node, ActionType::Add);
pub const NODE_LABEL_CHANGE: ClusterEvent = ClusterEvent::new(Resource::Node, ActionType::UpdateNodeLabel);
pub const NODE_ALLOCATABLE_CHANGE: ClusterEvent = ClusterEvent::new(Resource::Node, ActionType::UpdateNodeAllocatable);
pub const ASSIGNED_POD_DELETE: ClusterEvent = ClusterEvent::new(Resource::Pod, ActionType::Delete);
pub const WILDCARD_EVENT: ClusterEvent = ClusterEvent::new(Resource::WildCard, ActionType::All);
