//! Status record of a single artifact
//!
//! One record lives in the header of one document. Status changes go through
//! the transition validator; assignees, labels and epic have their own
//! updaters. Every effective mutation bumps `updated_at`.

use super::kind::{ArtifactKind, KindLookup, KindRegistry};
use super::status::{StateReason, Status};
use crate::parser::{MetaValue, Metadata};
use crate::state::{TransitionError, TransitionValidator};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::collections::BTreeSet;

/// Header keys owned by the record, in the order they are written
pub const STATUS_KEYS: [&str; 9] = [
    "id",
    "type",
    "status",
    "state_reason",
    "assignees",
    "labels",
    "epic",
    "created_at",
    "updated_at",
];

/// Problems found while turning header metadata into a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unknown artifact kind '{0}'")]
    UnknownKind(String),

    #[error("state_reason must be set exactly when status is closed (status: {status})")]
    ReasonMismatch { status: Status },

    #[error("updated_at is earlier than created_at")]
    TimestampOrder,

    #[error("Invalid timestamp for '{field}': {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Optional fields supplied when an artifact is first registered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArtifact {
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub epic: Option<String>,
}

/// Status metadata of one artifact
#[derive(Debug, Clone)]
pub struct StatusRecord {
    id: String,
    kind: ArtifactKind,
    status: Status,
    state_reason: Option<StateReason>,
    assignees: Vec<String>,
    labels: BTreeSet<String>,
    epic: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Header keys the record does not own, kept in document order
    extra: Metadata,
}

impl StatusRecord {
    /// Create an open record stamped with the current time
    pub fn new(id: impl Into<String>, kind: ArtifactKind) -> Self {
        Self::with_timestamp(id, kind, Utc::now())
    }

    /// Create an open record with a specific creation time
    pub fn with_timestamp(id: impl Into<String>, kind: ArtifactKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind,
            status: Status::Open,
            state_reason: None,
            assignees: Vec::new(),
            labels: BTreeSet::new(),
            epic: None,
            created_at,
            updated_at: created_at,
            extra: Metadata::new(),
        }
    }

    /// Apply the optional initial fields without touching `updated_at`
    pub(crate) fn with_fields(mut self, fields: NewArtifact) -> Self {
        for assignee in fields.assignees {
            if !self.assignees.contains(&assignee) {
                self.assignees.push(assignee);
            }
        }
        self.labels.extend(fields.labels);
        self.epic = fields.epic;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &ArtifactKind {
        &self.kind
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn state_reason(&self) -> Option<StateReason> {
        self.state_reason
    }

    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn epic(&self) -> Option<&str> {
        self.epic.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn extra(&self) -> &Metadata {
        &self.extra
    }

    pub fn is_assigned_to(&self, assignee: &str) -> bool {
        self.assignees.iter().any(|a| a == assignee)
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    pub fn can_transition_to(&self, target: Status, reason: Option<StateReason>) -> bool {
        TransitionValidator::can_transition(self.status, target, reason)
    }

    /// Move to `target`, reporting failure as `false` and leaving the record unchanged
    pub fn transition_to(&mut self, target: Status, reason: Option<StateReason>) -> bool {
        self.try_transition_to(target, reason).is_ok()
    }

    pub fn try_transition_to(
        &mut self,
        target: Status,
        reason: Option<StateReason>,
    ) -> Result<(), TransitionError> {
        self.try_transition_at(target, reason, Utc::now())
    }

    /// Transition with an explicit clock reading
    pub fn try_transition_at(
        &mut self,
        target: Status,
        reason: Option<StateReason>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if let Err(err) = TransitionValidator::validate(self.status, target, reason) {
            tracing::debug!(id = %self.id, from = %self.status, to = %target, error = %err, "transition rejected");
            return Err(err);
        }

        if TransitionValidator::is_reason_misuse(target, reason) {
            tracing::warn!(id = %self.id, to = %target, "state_reason ignored for non-closed target");
        }

        self.status = target;
        self.state_reason = match target {
            Status::Closed => reason,
            _ => None,
        };
        self.touch(now);
        Ok(())
    }

    // =========================================================================
    // Field updaters
    // =========================================================================

    pub fn add_assignee(&mut self, assignee: impl Into<String>) -> bool {
        let assignee = assignee.into();
        if self.is_assigned_to(&assignee) {
            return false;
        }
        self.assignees.push(assignee);
        self.touch(Utc::now());
        true
    }

    pub fn remove_assignee(&mut self, assignee: &str) -> bool {
        let before = self.assignees.len();
        self.assignees.retain(|a| a != assignee);
        let changed = self.assignees.len() != before;
        if changed {
            self.touch(Utc::now());
        }
        changed
    }

    /// Replace all assignees; later duplicates are dropped
    pub fn set_assignees<I, S>(&mut self, assignees: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next: Vec<String> = Vec::new();
        for assignee in assignees.into_iter().map(Into::into) {
            if !next.contains(&assignee) {
                next.push(assignee);
            }
        }
        if next == self.assignees {
            return false;
        }
        self.assignees = next;
        self.touch(Utc::now());
        true
    }

    pub fn add_label(&mut self, label: impl Into<String>) -> bool {
        let changed = self.labels.insert(label.into());
        if changed {
            self.touch(Utc::now());
        }
        changed
    }

    pub fn remove_label(&mut self, label: &str) -> bool {
        let changed = self.labels.remove(label);
        if changed {
            self.touch(Utc::now());
        }
        changed
    }

    pub fn set_epic(&mut self, epic: Option<String>) -> bool {
        if self.epic == epic {
            return false;
        }
        self.epic = epic;
        self.touch(Utc::now());
        true
    }

    /// Bump `updated_at`, never earlier than `created_at` or the previous value
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }

    // =========================================================================
    // Header mapping
    // =========================================================================

    /// Header metadata: the status keys in fixed order, then foreign keys
    pub fn to_metadata(&self) -> Metadata {
        let mut meta = Metadata::with_capacity(STATUS_KEYS.len() + self.extra.len());
        meta.insert("id".into(), self.id.as_str().into());
        meta.insert("type".into(), self.kind.as_str().into());
        meta.insert("status".into(), self.status.as_str().into());
        meta.insert(
            "state_reason".into(),
            self.state_reason.map(|r| r.as_str()).into(),
        );
        meta.insert("assignees".into(), self.assignees.clone().into());
        meta.insert(
            "labels".into(),
            MetaValue::List(self.labels.iter().cloned().collect()),
        );
        meta.insert("epic".into(), self.epic.clone().into());
        meta.insert("created_at".into(), format_timestamp(self.created_at).into());
        meta.insert("updated_at".into(), format_timestamp(self.updated_at).into());
        for (key, value) in &self.extra {
            meta.insert(key.clone(), value.clone());
        }
        meta
    }

    /// Build a record from header metadata, checking every invariant
    pub fn from_metadata(meta: &Metadata, registry: &KindRegistry) -> Result<Self, RecordError> {
        let id = scalar_text(meta, "id")?.ok_or(RecordError::MissingField("id"))?;
        if id.trim().is_empty() {
            return Err(RecordError::InvalidValue { field: "id", value: id });
        }

        let kind = match registry.resolve(required_text(meta, "type")?) {
            KindLookup::Known(kind) => kind,
            KindLookup::Unknown(name) => return Err(RecordError::UnknownKind(name)),
        };

        let status: Status = required_text(meta, "status")?
            .parse()
            .map_err(|value| RecordError::InvalidValue {
                field: "status",
                value,
            })?;

        let state_reason = optional_text(meta, "state_reason")?
            .map(|s| {
                s.parse::<StateReason>()
                    .map_err(|value| RecordError::InvalidValue {
                        field: "state_reason",
                        value,
                    })
            })
            .transpose()?;
        if (status == Status::Closed) != state_reason.is_some() {
            return Err(RecordError::ReasonMismatch { status });
        }

        let mut assignees: Vec<String> = Vec::new();
        for assignee in list(meta, "assignees")? {
            if !assignees.contains(&assignee) {
                assignees.push(assignee);
            }
        }
        let labels: BTreeSet<String> = list(meta, "labels")?.into_iter().collect();
        let epic = scalar_text(meta, "epic")?;

        let created = optional_timestamp(meta, "created_at")?;
        let updated = optional_timestamp(meta, "updated_at")?;
        let (created_at, updated_at) = match (created, updated) {
            (Some(c), Some(u)) => (c, u),
            (Some(c), None) => (c, c),
            (None, Some(u)) => (u, u),
            (None, None) => (DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::UNIX_EPOCH),
        };
        if updated_at < created_at {
            return Err(RecordError::TimestampOrder);
        }

        let extra = meta
            .iter()
            .filter(|(key, _)| !STATUS_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            kind,
            status,
            state_reason,
            assignees,
            labels,
            epic,
            created_at,
            updated_at,
            extra,
        })
    }
}

/// Assignee order is presentation only
impl PartialEq for StatusRecord {
    fn eq(&self, other: &Self) -> bool {
        let same_assignees = self.assignees.len() == other.assignees.len()
            && self.assignees.iter().all(|a| other.is_assigned_to(a));

        self.id == other.id
            && self.kind == other.kind
            && self.status == other.status
            && self.state_reason == other.state_reason
            && same_assignees
            && self.labels == other.labels
            && self.epic == other.epic
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && self.extra == other.extra
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn required_text<'a>(meta: &'a Metadata, field: &'static str) -> Result<&'a str, RecordError> {
    optional_text(meta, field)?.ok_or(RecordError::MissingField(field))
}

fn optional_text<'a>(meta: &'a Metadata, field: &'static str) -> Result<Option<&'a str>, RecordError> {
    match meta.get(field) {
        None | Some(MetaValue::Null) => Ok(None),
        Some(value) => value
            .as_text()
            .map(Some)
            .ok_or_else(|| RecordError::InvalidValue {
                field,
                value: format!("{value:?}"),
            }),
    }
}

/// Free-form text field; hand-written `id: 42` or `epic: 2024` reads as text
fn scalar_text(meta: &Metadata, field: &'static str) -> Result<Option<String>, RecordError> {
    match meta.get(field) {
        Some(MetaValue::Integer(n)) => Ok(Some(n.to_string())),
        Some(MetaValue::Bool(b)) => Ok(Some(b.to_string())),
        _ => Ok(optional_text(meta, field)?.map(str::to_string)),
    }
}

fn list(meta: &Metadata, field: &'static str) -> Result<Vec<String>, RecordError> {
    match meta.get(field) {
        None | Some(MetaValue::Null) => Ok(Vec::new()),
        Some(MetaValue::List(items)) => Ok(items.clone()),
        // A lone scalar is a one-element list
        Some(MetaValue::Text(s)) => Ok(vec![s.clone()]),
        Some(other) => Err(RecordError::InvalidValue {
            field,
            value: format!("{other:?}"),
        }),
    }
}

fn optional_timestamp(meta: &Metadata, field: &'static str) -> Result<Option<DateTime<Utc>>, RecordError> {
    optional_text(meta, field)?
        .map(|raw| {
            parse_timestamp(raw).ok_or_else(|| RecordError::InvalidTimestamp {
                field,
                value: raw.to_string(),
            })
        })
        .transpose()
}

/// ISO-8601 timestamp; values without an offset are taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
