//! Placement constraints read from pod labels.

use std::collections::BTreeMap;

/// Constraint key to required value. Order carries no meaning.
pub type Constraints = BTreeMap<String, String>;

/// Returns every label whose key starts with `prefix`.
/// An empty prefix accepts all labels.
pub fn extract_constraints(labels: &BTreeMap<String, String>, prefix: &str) -> Constraints {
    labels.iter()
        .filter(|(key, _)| prefix.is_empty() || key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
