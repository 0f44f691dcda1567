use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque job-state token as reported by the backend.
///
/// OME reports numeric status codes, iDRAC reports Redfish state names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateToken {
    Code(i64),
    Name(String),
}

impl StateToken {
    /// Read a token out of a JSON scalar. Anything else has no token.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(StateToken::Code),
            Value::String(s) => Some(StateToken::Name(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateToken::Code(code) => write!(f, "{code}"),
            StateToken::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for StateToken {
    fn from(code: i64) -> Self {
        StateToken::Code(code)
    }
}

impl From<i32> for StateToken {
    fn from(code: i32) -> Self {
        StateToken::Code(i64::from(code))
    }
}

impl From<&str> for StateToken {
    fn from(name: &str) -> Self {
        StateToken::Name(name.to_string())
    }
}

/// Keys to walk from the document root down to the state token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePath(Vec<String>);

impl StatePath {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Walk the path. A missing key or a non-scalar leaf yields `None`.
    pub fn extract(&self, document: &Value) -> Option<StateToken> {
        let leaf = self
            .0
            .iter()
            .try_fold(document, |node, key| node.get(key.as_str()))?;
        StateToken::from_json(leaf)
    }
}

impl From<&str> for StatePath {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl<const N: usize> From<[&str; N]> for StatePath {
    fn from(keys: [&str; N]) -> Self {
        Self::new(keys)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Where a token falls in a [`JobStateClassification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    Complete,
    Failed,
    Running,
}

/// Which tokens mean done, failed and still running for one job type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStateClassification {
    pub complete_states: HashSet<StateToken>,
    pub fail_states: HashSet<StateToken>,
    /// Empty means "anything not complete or failed is running".
    pub running_states: HashSet<StateToken>,
    pub state_path: StatePath,
}

impl JobStateClassification {
    pub fn new<T: Into<StateToken>>(
        complete: impl IntoIterator<Item = T>,
        fail: impl IntoIterator<Item = T>,
        running: impl IntoIterator<Item = T>,
        state_path: impl Into<StatePath>,
    ) -> Self {
        Self {
            complete_states: complete.into_iter().map(Into::into).collect(),
            fail_states: fail.into_iter().map(Into::into).collect(),
            running_states: running.into_iter().map(Into::into).collect(),
            state_path: state_path.into(),
        }
    }

    /// OpenManage Enterprise job status codes under `LastRunStatus.Id`.
    pub fn ome() -> Self {
        Self::new(
            [2060, 2020, 2090],
            [2070, 2101, 2102, 2103],
            [2050, 2040, 2030, 2100],
            ["LastRunStatus", "Id"],
        )
    }

    /// iDRAC Redfish job states under `JobState`.
    pub fn idrac() -> Self {
        Self::new(
            ["Completed", "Downloaded", "CompletedWithErrors", "RebootCompleted"],
            ["Failed", "RebootFailed", "Unknown"],
            [
                "Running",
                "RebootPending",
                "Scheduling",
                "Scheduled",
                "Downloading",
                "Waiting",
                "Paused",
                "New",
                "PendingActivation",
                "ReadyForExecution",
            ],
            "JobState",
        )
    }

    /// Complete and fail sets must be disjoint.
    pub fn has_overlap(&self) -> bool {
        !self.complete_states.is_disjoint(&self.fail_states)
    }

    /// Unknown tokens, and a missing token, count as running.
    pub fn classify(&self, token: Option<&StateToken>) -> StateClass {
        match token {
            Some(t) if self.complete_states.contains(t) => StateClass::Complete,
            Some(t) if self.fail_states.contains(t) => StateClass::Failed,
            _ => StateClass::Running,
        }
    }

    pub fn is_known_running(&self, token: &StateToken) -> bool {
        self.running_states.contains(token)
    }
}

/// Human-readable name of an OME job status code.
pub fn ome_status_name(code: i64) -> Option<&'static str> {
    let name = match code {
        2020 => "Scheduled",
        2030 => "Queued",
        2040 => "Starting",
        2050 => "Running",
        2060 => "Completed",
        2070 => "Failed",
        2080 => "New",
        2090 => "Warning",
        2100 => "Aborted",
        2101 => "Paused",
        2102 => "Stopped",
        2103 => "Canceled",
        _ => return None,
    };
    Some(name)
}
