//! Status and closure-reason values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an artifact
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Newly created or reopened
    #[default]
    Open,
    /// Work has started
    InProgress,
    /// Waiting on something external
    Blocked,
    /// Finished; always paired with a [`StateReason`]
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Blocked,
        Status::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Blocked => "blocked",
            Status::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Why an artifact was closed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StateReason {
    Completed,
    Cancelled,
    Duplicate,
    NotPlanned,
    Transferred,
}

impl StateReason {
    pub const ALL: [StateReason; 5] = [
        StateReason::Completed,
        StateReason::Cancelled,
        StateReason::Duplicate,
        StateReason::NotPlanned,
        StateReason::Transferred,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateReason::Completed => "completed",
            StateReason::Cancelled => "cancelled",
            StateReason::Duplicate => "duplicate",
            StateReason::NotPlanned => "not_planned",
            StateReason::Transferred => "transferred",
        }
    }
}

impl fmt::Display for StateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
