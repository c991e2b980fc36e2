use std::collections::HashMap;
use std::fmt::Display;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::answer::AnswerValue;
use crate::model::form::Form;
use crate::model::id::Id;

/// In-memory working answers for one respondent filling in one form.
///
/// All operations are local and synchronous; nothing here touches the store.
/// Restored values for questions that no longer exist are kept (and survive
/// another round trip) but are never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    values: HashMap<Id, AnswerValue>,
}

/// A required question with no usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredViolation {
    pub question: Id,
    pub label: String,
}

impl Display for RequiredViolation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{:?} requires an answer", self.label)
    }
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from previously serialized values, tolerating unknown keys.
    pub fn from_values(values: HashMap<Id, AnswerValue>) -> Self {
        Self { values }
    }

    /// Snapshot the values in storable shape.
    pub fn to_values(&self) -> HashMap<Id, AnswerValue> {
        self.values.clone()
    }

    pub fn get(&self, question: Id) -> Option<&AnswerValue> {
        self.values.get(&question)
    }

    /// Whether the question has a non-empty answer.
    pub fn is_answered(&self, question: Id) -> bool {
        self.get(question).is_some_and(|value| !value.is_empty())
    }

    /// Overwrite the answer to a question.
    pub fn set(&mut self, question: Id, value: impl Into<AnswerValue>) {
        self.values.insert(question, value.into());
    }

    /// Erase the answer to a question entirely.
    pub fn clear(&mut self, question: Id) {
        self.values.remove(&question);
    }

    /// Add or remove a single option in a multi-choice answer without
    /// disturbing the other selections. A stored single-valued answer is
    /// discarded first: toggling only makes sense on a selection list.
    pub fn toggle(&mut self, question: Id, option: &str, included: bool) {
        let value = self
            .values
            .entry(question)
            .or_insert_with(|| AnswerValue::Selections(Vec::new()));
        if let AnswerValue::Text(_) = value {
            debug!("toggle on question {question} replaced a non-selection value");
            *value = AnswerValue::Selections(Vec::new());
        }
        if let AnswerValue::Selections(selections) = value {
            if included {
                if !selections.iter().any(|existing| existing == option) {
                    selections.push(option.to_string());
                }
            } else {
                selections.retain(|existing| existing != option);
            }
        }
    }

    /// Every `required` question of the form with an absent or empty answer,
    /// in question order.
    pub fn validate_against(&self, form: &Form) -> Vec<RequiredViolation> {
        form.questions
            .iter()
            .filter(|question| question.required && !self.is_answered(question.id))
            .map(|question| RequiredViolation {
                question: question.id,
                label: question.label.clone(),
            })
            .collect()
    }
}
