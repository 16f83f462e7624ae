//! Work items, invocations and raw results
//!
//! ## Identity
//!
//! A [`WorkItem`]'s `id` is assigned once, at grid expansion, and is the only
//! ordering key used downstream. Every [`Invocation`] and [`RawResult`]
//! carries the id of the item it came from, so results can be re-associated
//! no matter in which order the worker pool finishes them.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Identity of a work item: its position in grid traversal order
pub type WorkItemId = usize;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer knob (load factor, bit widths, type ids)
    Int(i64),
    /// Free-form text knob
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Named parameter values of one work item, in axis declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Parameters(Vec<(String, ParamValue)>);

impl Parameters {
    /// Empty parameter set
    pub fn new() -> Self {
        Parameters(Vec::new())
    }

    /// Append a parameter (callers guarantee names are unique)
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.push((name.into(), value.into()));
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<ParamValue>> FromIterator<(N, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Parameters(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

// Serialized as a JSON object that keeps declaration order.
impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

/// One concrete parameter combination with a stable identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// Position in grid traversal order
    pub id: WorkItemId,
    /// Parameter values for this combination
    pub parameters: Parameters,
}

impl WorkItem {
    /// Create a work item
    pub fn new(id: WorkItemId, parameters: Parameters) -> Self {
        WorkItem { id, parameters }
    }
}

/// What an invocation does for its work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Build the data structure under the OS timing utility
    Build,
    /// Run the speed test against an already-built structure
    Speed,
    /// Single timed measurement run
    Measure,
}

impl Role {
    /// Get string representation, also used as metric key prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Build => "build",
            Role::Speed => "speed",
            Role::Measure => "measure",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external command derived from a work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Originating work item
    pub item_id: WorkItemId,
    /// Role of this command within the work item
    pub role: Role,
    /// Shell command line
    pub command: String,
}

impl Invocation {
    /// Create an invocation
    pub fn new(item_id: WorkItemId, role: Role, command: impl Into<String>) -> Self {
        Invocation {
            item_id,
            role,
            command: command.into(),
        }
    }
}

/// How an invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationStatus {
    /// Process exited with status 0
    Success,
    /// Process exited non-zero, or was killed (`exit_code` is `None`)
    Failed {
        /// Exit code if the process exited normally
        exit_code: Option<i32>,
    },
    /// Process could not be started at all
    SpawnFailed {
        /// Launcher error message
        reason: String,
    },
}

impl InvocationStatus {
    /// Check if the process ran and exited cleanly
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationStatus::Success)
    }
}

impl fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationStatus::Success => f.write_str("success"),
            InvocationStatus::Failed {
                exit_code: Some(code),
            } => write!(f, "exit status: {}", code),
            InvocationStatus::Failed { exit_code: None } => f.write_str("terminated by signal"),
            InvocationStatus::SpawnFailed { reason } => write!(f, "spawn failed: {}", reason),
        }
    }
}

/// Verbatim capture of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    /// Originating work item
    pub item_id: WorkItemId,
    /// Role of the invocation
    pub role: Role,
    /// Command line that was run
    pub command: String,
    /// Merged stdout/stderr text
    pub captured: String,
    /// Exit outcome
    pub status: InvocationStatus,
}

impl RawResult {
    /// Build a result for `invocation` with the given capture and status
    pub fn new(invocation: &Invocation, captured: String, status: InvocationStatus) -> Self {
        RawResult {
            item_id: invocation.item_id,
            role: invocation.role,
            command: invocation.command.clone(),
            captured,
            status,
        }
    }
}
