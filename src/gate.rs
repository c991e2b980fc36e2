//! The submission gate: computes whether a respondent may currently write,
//! and orchestrates create-vs-update against the persistence adapter.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use crate::model::answer::{AnswerSet, AnswerStore};
use crate::model::form::{Form, Schedule};
use crate::model::id::Id;
use crate::model::role::ParticipantRole;
use crate::render::RenderMode;
use crate::store::PersistenceAdapter;

/// Whether submissions are currently accepted, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Within the window with a writing role.
    Open,
    /// The window has not opened yet.
    LockedFuture,
    /// The window has closed.
    LockedPast,
    /// The viewer is a team member; only the leader writes.
    LockedRole,
}

impl GateState {
    /// Pure transition function of time, schedule, and role.
    pub fn evaluate(now: DateTime<Utc>, schedule: &Schedule, role: ParticipantRole) -> Self {
        if !role.can_write() {
            // Members never write, regardless of time.
            Self::LockedRole
        } else if schedule.opens_in_future(now) {
            Self::LockedFuture
        } else if schedule.contains(now) {
            Self::Open
        } else {
            Self::LockedPast
        }
    }

    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// Only the open gate renders editable widgets.
    pub fn render_mode(self) -> RenderMode {
        if self.is_open() {
            RenderMode::Editable
        } else {
            RenderMode::ReadOnly
        }
    }
}

impl Display for GateState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Open => "submissions are open",
                Self::LockedFuture => "this form has not opened yet",
                Self::LockedPast => "this form has closed",
                Self::LockedRole => "only the team leader may edit the shared submission",
            }
        )
    }
}

/// Push the current answers through the gate.
///
/// With no prior record under `key`, inserts a new submitted answer set;
/// with one, updates its values in place, preserving its identity: an edit,
/// never a duplicate. Fails without writing when the gate is not open or a
/// required question is unanswered.
pub async fn submit_answers<A>(
    adapter: &A,
    form: &Form,
    answers: &AnswerStore,
    key: Id,
    state: GateState,
    now: DateTime<Utc>,
) -> Result<AnswerSet>
where
    A: PersistenceAdapter + ?Sized,
{
    if !state.is_open() {
        debug!("submit for form {} blocked: {state}", form.id);
        return Err(GateError::NotOpen { state }.into());
    }

    let violations = answers.validate_against(form);
    if !violations.is_empty() {
        debug!(
            "submit for form {} blocked by {} required-field violation(s)",
            form.id,
            violations.len()
        );
        return Err(GateError::RequiredMissing {
            count: violations.len(),
        }
        .into());
    }

    let set = match adapter.answer_set(form.id, key).await? {
        Some(mut existing) => {
            existing.update(answers.to_values(), now);
            existing
        }
        None => AnswerSet::new(form.id, key, answers.to_values(), now),
    };

    adapter.upsert_answer_set(set.clone()).await?;
    info!("submitted answer set {} for form {}", set.id, form.id);
    Ok(set)
}
