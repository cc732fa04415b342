use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use k8s_context_scheduler::cycle_state::{CycleState, StateData};
use k8s_context_scheduler::default_scheduler_plugins::context_aware::PreScoreState;
use k8s_context_scheduler::error::SchedulerError;

#[derive(Clone, Debug, PartialEq)]
struct Counter {
    value: u64,
}

impl StateData for Counter {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn constraints(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_write_then_read_returns_same_content() {
    let state = CycleState::new();
    let written = PreScoreState::new(constraints(&[("ctx/region", "eu"), ("ctx/tier", "gold")]));
    state.write("key", written.clone());

    let read = state.read_as::<PreScoreState>("key").unwrap();
    assert_eq!(read, written);
    assert!(state.contains("key"));
    assert_eq!(state.len(), 1);
}

#[test]
fn test_read_missing_key() {
    let state = CycleState::new();
    assert!(matches!(state.read("missing"), Err(SchedulerError::StateNotFound(_))));
    assert!(matches!(state.read_as::<Counter>("missing"), Err(SchedulerError::StateNotFound(_))));
}

#[test]
fn test_read_as_wrong_type() {
    let state = CycleState::new();
    state.write("key", Counter { value: 1 });

    match state.read_as::<PreScoreState>("key") {
        Err(SchedulerError::UnexpectedStateType { key, found }) => {
            assert_eq!(key, "key");
            assert!(found.ends_with("Counter"));
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_dynamic_read_and_downcast() {
    let state = CycleState::new();
    state.write("counter", Counter { value: 5 });
    let data = state.read("counter").unwrap();
    assert_eq!(data.as_any().downcast_ref::<Counter>(), Some(&Counter { value: 5 }));
    assert!(data.as_any().downcast_ref::<PreScoreState>().is_none());
}

#[test]
fn test_delete() {
    let state = CycleState::new();
    state.write("counter", Counter { value: 5 });
    state.delete("counter");
    assert!(!state.contains("counter"));
    assert!(state.is_empty());
}

#[test]
fn test_branch_is_independent() {
    let state = CycleState::new();
    state.write("counter", Counter { value: 1 });
    state.skip_score_plugin("Skipped");

    let branch = state.clone();
    branch.write("counter", Counter { value: 2 });
    branch.write("extra", Counter { value: 3 });

    assert_eq!(state.read_as::<Counter>("counter").unwrap().value, 1);
    assert!(!state.contains("extra"));
    assert_eq!(branch.read_as::<Counter>("counter").unwrap().value, 2);
    assert!(branch.is_score_skipped("Skipped"));
}

#[test]
fn test_pre_score_state_clone_shares_constraints() {
    let state = PreScoreState::new(constraints(&[("ctx/region", "eu")]));
    let copy = state.clone();
    assert!(std::ptr::eq(state.constraints(), copy.constraints()));
}

#[test]
fn test_concurrent_readers() {
    let state = Arc::new(CycleState::new());
    state.write("key", PreScoreState::new(constraints(&[("ctx/region", "eu")])));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            thread::spawn(move || {
                (0..100)
                    .map(|_| state.read_as::<PreScoreState>("key").unwrap().constraints().len())
                    .sum::<usize>()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 100);
    }
}
