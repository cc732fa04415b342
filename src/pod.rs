//! Representation of the k8s pod

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Pod status
#[derive(Clone, Debug, PartialEq)]
pub enum PodStatus {
    Pending,
    Running,
}

impl Display for PodStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            PodStatus::Pending => write!(f, "pending"),
            PodStatus::Running => write!(f, "running"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pod {
    pub uid: u64,
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,

    pub requested_cpu: f32,
    pub requested_memory: f64,
    pub priority_weight: u64,

    pub scheduling_attempts: u64,
    pub status: PodStatus,
}

impl Pod {
    pub fn new(
        uid: u64,
        name: impl Into<String>,
        labels: BTreeMap<String, String>,
        requested_cpu: f32,
        requested_memory: f64,
        priority_weight: u64,
    ) -> Self {
        Self {
            uid,
            name: name.into(),
            namespace: "default".to_string(),
            labels,
            requested_cpu,
            requested_memory,
            priority_weight,
            scheduling_attempts: 0,
            status: PodStatus::Pending,
        }
    }

    /// `namespace/name`, used in logs.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}


/// Comparision operators for prioritizing pods
impl Eq for Pod {}

impl PartialEq for Pod {
    fn eq(&self, other: &Self) -> bool {
        self.priority_weight == other.priority_weight
    }
}

impl Ord for Pod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority_weight.cmp(&other.priority_weight)
    }
}

impl PartialOrd for Pod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
