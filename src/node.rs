//! Representation of the k8s node

use std::collections::BTreeMap;

/// What the scheduler knows about a node at the start of a cycle.
#[derive(Clone, Debug)]
pub struct NodeInfo {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub cpu_total: u32,
    pub memory_total: u64,
    pub cpu_allocated: f32,
    pub memory_allocated: f64,
}

impl NodeInfo {
    pub fn new(name: impl Into<String>, labels: BTreeMap<String, String>,
               cpu_total: u32, memory_total: u64) -> Self {
        Self {
            name: name.into(),
            labels,
            cpu_total,
            memory_total,
            cpu_allocated: 0.0,
            memory_allocated: 0.0,
        }
    }

    pub fn get_free_cpu(&self) -> f32 {
        (self.cpu_total as f32) - self.cpu_allocated
    }

    pub fn get_free_memory(&self) -> f64 {
        (self.memory_total as f64) - self.memory_allocated
    }

    pub fn can_place_pod(&self, requested_cpu: f32, requested_memory: f64) -> bool {
        self.get_free_cpu() >= requested_cpu &&
            self.get_free_memory() >= requested_memory
    }

    /// Share of CPU allocated after placing `extra_cpu` more.
    pub fn cpu_utilization_with(&self, extra_cpu: f32) -> f64 {
        if self.cpu_total == 0 {
            return 1.0;
        }
        ((self.cpu_allocated + extra_cpu) as f64) / (self.cpu_total as f64)
    }

    /// Share of memory allocated after placing `extra_memory` more.
    pub fn memory_utilization_with(&self, extra_memory: f64) -> f64 {
        if self.memory_total == 0 {
            return 1.0;
        }
        (self.memory_allocated + extra_memory) / (self.memory_total as f64)
    }

    pub fn allocate(&mut self, requested_cpu: f32, requested_memory: f64) -> bool {
        if !self.can_place_pod(requested_cpu, requested_memory) {
            return false;
        }
        self.cpu_allocated += requested_cpu;
        self.memory_allocated += requested_memory;
        true
    }
}
