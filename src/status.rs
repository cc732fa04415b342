//! Outcome of a single extension point call.

use std::fmt::{Display, Formatter};
use crate::error::SchedulerError;

/// Status code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    Success,
    /// Internal plugin error, not caused by the pod or the node.
    Error,
    /// The pod does not fit the node right now.
    Unschedulable,
    /// The plugin has nothing to do for this pod.
    Skip,
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Code::Success => write!(f, "success"),
            Code::Error => write!(f, "error"),
            Code::Unschedulable => write!(f, "unschedulable"),
            Code::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    code: Code,
    reasons: Vec<String>,
    plugin: Option<String>,
}

impl Status {
    pub fn new(code: Code, reason: impl Into<String>) -> Self {
        Self {
            code,
            reasons: vec![reason.into()],
            plugin: None,
        }
    }

    pub fn success() -> Self {
        Self {
            code: Code::Success,
            reasons: Vec::default(),
            plugin: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(Code::Error, reason)
    }

    /// Wraps an error into an `Error` status.
    pub fn as_status(err: &SchedulerError) -> Self {
        Self::error(err.to_string())
    }

    /// Attributes the status to a plugin, for diagnostics.
    pub fn with_plugin(mut self, plugin: &str) -> Self {
        self.plugin = Some(plugin.to_string());
        self
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }

    pub fn is_skip(&self) -> bool {
        self.code == Code::Skip
    }

    pub fn message(&self) -> String {
        self.reasons.join(", ")
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match &self.plugin {
            Some(plugin) => write!(f, "{} ({}): {}", self.code, plugin, self.message()),
            None => write!(f, "{}: {}", self.code, self.message()),
        }
    }
}

impl From<SchedulerError> for Status {
    fn from(err: SchedulerError) -> Self {
        Self::as_status(&err)
    }
}
