//! Filter criteria for corpus queries

use crate::models::{StateReason, Status, StatusRecord};

/// Conditions a record must meet; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCriteria {
    pub status: Option<Status>,
    /// Must be one of the record's assignees
    pub assignee: Option<String>,
    pub state_reason: Option<StateReason>,
    pub epic: Option<String>,
    /// Must be one of the record's labels
    pub label: Option<String>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_state_reason(mut self, reason: StateReason) -> Self {
        self.state_reason = Some(reason);
        self
    }

    pub fn with_epic(mut self, epic: impl Into<String>) -> Self {
        self.epic = Some(epic.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// All supplied conditions hold
    pub fn matches(&self, record: &StatusRecord) -> bool {
        self.status.map_or(true, |s| record.status() == s)
            && self
                .assignee
                .as_deref()
                .map_or(true, |a| record.is_assigned_to(a))
            && self
                .state_reason
                .map_or(true, |r| record.state_reason() == Some(r))
            && self.epic.as_deref().map_or(true, |e| record.epic() == Some(e))
            && self
                .label
                .as_deref()
                .map_or(true, |l| record.labels().contains(l))
    }
}
