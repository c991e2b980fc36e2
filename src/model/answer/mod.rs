//! Answer values and the per-respondent answer set record.

mod store;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::id::Id;

pub use store::{AnswerStore, RequiredViolation};

/// One stored answer. The shape is keyed by the question's type: every
/// single-valued type stores `Text`, multi-choice stores `Selections`.
/// Untagged serde keeps the wire shape a bare string or array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Selections(Vec<String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn selections<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Selections(values.into_iter().map(Into::into).collect())
    }

    /// An empty string or an empty selection list counts as no answer.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Selections(selections) => selections.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Selections(_) => None,
        }
    }

    pub fn as_selections(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::Selections(selections) => Some(selections),
        }
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        Self::Selections(values)
    }
}

/// Submission lifecycle of an answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Held locally, not yet pushed through the gate.
    DraftLocal,
    /// Accepted by the store.
    Submitted,
}

/// One respondent's (or team's) collected values for a form, as stored.
///
/// At most one non-superseded set exists per (form, respondent) key; under
/// team mode the key is the team ID and the record is attributed to the
/// team's leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSet {
    /// Record unique ID, preserved across updates.
    pub id: Id,
    /// The form these answers belong to.
    pub form_id: Id,
    /// Owning key: respondent ID, or team ID in team mode.
    pub respondent: Id,
    /// Answers by question ID. Keys for since-removed questions are
    /// retained (tolerant reads) but never rendered.
    pub values: HashMap<Id, AnswerValue>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnswerSet {
    /// A brand new submitted record.
    pub fn new(
        form_id: Id,
        respondent: Id,
        values: HashMap<Id, AnswerValue>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Id::new(),
            form_id,
            respondent,
            values,
            status: SubmissionStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the values in place, preserving record identity. This is an
    /// edit of the existing submission, never a second record.
    pub fn update(&mut self, values: HashMap<Id, AnswerValue>, now: DateTime<Utc>) {
        self.values = values;
        self.status = SubmissionStatus::Submitted;
        self.updated_at = now;
    }
}
