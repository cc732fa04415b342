//! Pods waiting for a scheduling attempt.
//!
//! Pods that could not be placed are parked in the unschedulable pool until a
//! cluster event arrives that one of the plugins which rejected them has
//! registered interest in.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use log::debug;
use crate::events::ClusterEvent;
use crate::pod::Pod;

/// A parked pod and the plugins that rejected it in its last attempt.
#[derive(Clone, Debug)]
pub struct QueuedPodInfo {
    pub pod: Pod,
    pub rejected_by: BTreeSet<String>,
}

struct ActiveEntry {
    pod: Pod,
    seq: u64,
}

/// Higher priority first, FIFO among equal priorities.
impl Ord for ActiveEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pod.cmp(&other.pod).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ActiveEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ActiveEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ActiveEntry {}

#[derive(Default)]
pub struct SchedulingQueue {
    active_queue: BinaryHeap<ActiveEntry>,
    pub unschedulable_queue: Vec<QueuedPodInfo>,
    cluster_events: HashMap<String, Vec<ClusterEvent>>,
    seq: u64,
}

impl SchedulingQueue {
    /// `cluster_events` maps plugin names to the events they registered.
    pub fn new(cluster_events: HashMap<String, Vec<ClusterEvent>>) -> Self {
        Self {
            cluster_events,
            ..Default::default()
        }
    }

    pub fn add(&mut self, pod: Pod) {
        self.seq += 1;
        self.active_queue.push(ActiveEntry { pod, seq: self.seq });
    }

    pub fn pop(&mut self) -> Option<Pod> {
        self.active_queue.pop().map(|entry| entry.pod)
    }

    pub fn add_unschedulable(&mut self, pod: Pod, rejected_by: BTreeSet<String>) {
        debug!("pod={} is unschedulable, rejected by {:?}", pod.key(), rejected_by);
        self.unschedulable_queue.push(QueuedPodInfo { pod, rejected_by });
    }

    /// Moves back to the active queue every parked pod that `event` may help.
    /// Returns how many pods were moved.
    pub fn move_all_to_active_queue(&mut self, event: &ClusterEvent) -> usize {
        let (to_move, to_keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.unschedulable_queue)
            .into_iter()
            .partition(|info| self.is_worth_requeuing(info, event));
        self.unschedulable_queue = to_keep;
        let moved = to_move.len();
        for info in to_move {
            self.add(info.pod);
        }
        if moved > 0 {
            debug!("{} moved {} unschedulable pods to the active queue", event, moved);
        }
        moved
    }

    /// A pod without rejecting plugins is retried on any event.
    fn is_worth_requeuing(&self, info: &QueuedPodInfo, event: &ClusterEvent) -> bool {
        if info.rejected_by.is_empty() {
            return true;
        }
        info.rejected_by.iter().any(|plugin| {
            self.cluster_events.get(plugin)
                .is_some_and(|events| events.iter().any(|registered| registered.matches(event)))
        })
    }

    pub fn active_len(&self) -> usize {
        self.active_queue.len()
    }

    pub fn unschedulable_len(&self) -> usize {
        self.unschedulable_queue.len()
    }
}
