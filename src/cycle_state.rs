//! Per scheduling attempt state shared between extension points.
//!
//! A fresh `CycleState` is created by the host for every attempt to place a pod
//! and dropped when the attempt ends. Plugins write derived data once (usually in
//! PreScore) and read it any number of times afterwards, possibly from several
//! threads at once while Score runs for different nodes.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use dyn_clone::{clone_trait_object, DynClone};
use crate::error::{SchedulerError, SchedulerResult};

pub type StateKey = String;

/// A value stored in the cycle state.
///
/// `Clone` is used when the state is branched. Implementations holding data that
/// is never mutated after being written may share it instead of copying.
pub trait StateData: DynClone + Send + Sync + 'static {
    /// Access to the concrete value for downcasting.
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

clone_trait_object!(StateData);

#[derive(Default)]
pub struct CycleState {
    storage: RwLock<HashMap<StateKey, Arc<dyn StateData>>>,
    /// Score plugins whose PreScore returned `Skip` in this cycle.
    skip_score_plugins: RwLock<BTreeSet<String>>,
}

impl CycleState {
    pub fn new() -> Self {
        Default::default()
    }

    /// Stores `value` under `key`, replacing whatever was there.
    pub fn write<T: StateData>(&self, key: impl Into<StateKey>, value: T) {
        self.storage.write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), Arc::new(value));
    }

    /// Returns the value stored under `key`.
    pub fn read(&self, key: &str) -> SchedulerResult<Arc<dyn StateData>> {
        self.storage.read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| SchedulerError::StateNotFound(key.to_string()))
    }

    /// Returns a copy of the value stored under `key` if it has type `T`.
    pub fn read_as<T: StateData + Clone>(&self, key: &str) -> SchedulerResult<T> {
        let data = self.read(key)?;
        data.as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| SchedulerError::UnexpectedStateType {
                key: key.to_string(),
                found: data.type_name(),
            })
    }

    pub fn delete(&self, key: &str) {
        self.storage.write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.storage.read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.storage.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn skip_score_plugin(&self, plugin: &str) {
        self.skip_score_plugins.write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(plugin.to_string());
    }

    pub fn is_score_skipped(&self, plugin: &str) -> bool {
        self.skip_score_plugins.read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(plugin)
    }
}

/// Branches the state: every entry is cloned through `StateData`, so later
/// writes to either copy are not visible in the other.
impl Clone for CycleState {
    fn clone(&self) -> Self {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        let copied: HashMap<StateKey, Arc<dyn StateData>> = storage.iter()
            .map(|(key, value)| (key.clone(), Arc::from(dyn_clone::clone_box(&**value))))
            .collect();
        let skipped = self.skip_score_plugins.read().unwrap_or_else(PoisonError::into_inner).clone();
        Self {
            storage: RwLock::new(copied),
            skip_score_plugins: RwLock::new(skipped),
        }
    }
}
