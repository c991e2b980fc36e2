//! Interprets a form schema into host-displayable widgets.
//!
//! The same interpretation backs the builder's live preview and the
//! respondent-facing submission view; only the mode differs.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::model::answer::{AnswerStore, AnswerValue};
use crate::model::form::{Form, Question, QuestionType};
use crate::model::id::Id;

/// How widgets behave for the current viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Widgets accept input and bind to the answer store.
    Editable,
    /// Stored values are displayed verbatim; no input accepted.
    ReadOnly,
    /// Builder preview: structure without input, against an empty store.
    Preview,
}

impl RenderMode {
    pub fn is_editable(self) -> bool {
        self == Self::Editable
    }
}

/// One displayable question, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub question: Id,
    pub label: String,
    pub required: bool,
    pub editable: bool,
    pub control: Control,
}

/// The input control for a question, with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Control {
    /// Single-line input: short text, number, url, email, date.
    TextLine { value: Option<String> },
    /// Multi-line input: long text.
    TextArea { value: Option<String> },
    /// Mutually exclusive selection; choosing one clears any other.
    ChoiceGroup {
        options: Vec<String>,
        selected: Option<String>,
    },
    /// Independent per-option toggles.
    CheckGroup {
        options: Vec<String>,
        selected: Vec<String>,
    },
    /// Single selection from a list, no default selected.
    Dropdown {
        options: Vec<String>,
        selected: Option<String>,
    },
    /// Two-state toggle; `None` when nothing has been stored yet.
    Toggle { on: Option<bool> },
}

impl Widget {
    pub fn is_answered(&self) -> bool {
        match &self.control {
            Control::TextLine { value } | Control::TextArea { value } => {
                value.as_ref().is_some_and(|text| !text.trim().is_empty())
            }
            Control::ChoiceGroup { selected, .. } | Control::Dropdown { selected, .. } => {
                selected.is_some()
            }
            Control::CheckGroup { selected, .. } => !selected.is_empty(),
            Control::Toggle { on } => on.is_some(),
        }
    }

    /// The stored value verbatim, or "no answer". Hosts may localise; the
    /// raw value is available on the control itself.
    pub fn display_value(&self) -> String {
        const NO_ANSWER: &str = "no answer";
        match &self.control {
            Control::TextLine { value } | Control::TextArea { value } => value
                .clone()
                .unwrap_or_else(|| NO_ANSWER.to_string()),
            Control::ChoiceGroup { selected, .. } | Control::Dropdown { selected, .. } => selected
                .clone()
                .unwrap_or_else(|| NO_ANSWER.to_string()),
            Control::CheckGroup { selected, .. } => {
                if selected.is_empty() {
                    NO_ANSWER.to_string()
                } else {
                    selected.join(", ")
                }
            }
            Control::Toggle { on } => match on {
                Some(on) => on.to_string(),
                None => NO_ANSWER.to_string(),
            },
        }
    }
}

/// The stored text for a single-valued question, if its shape matches.
fn text_value(question: &Question, store: &AnswerStore) -> Option<String> {
    match store.get(question.id) {
        Some(AnswerValue::Text(text)) => Some(text.clone()),
        Some(AnswerValue::Selections(_)) => {
            // Wrong shape for this question type; display as unanswered
            // rather than coercing.
            debug!(
                "question {} ({}) holds a selection list; ignoring",
                question.id, question.question_type
            );
            None
        }
        None => None,
    }
}

/// The stored selections for a multi-choice question, if the shape matches.
fn selection_values(question: &Question, store: &AnswerStore) -> Vec<String> {
    match store.get(question.id) {
        Some(AnswerValue::Selections(selections)) => selections.clone(),
        Some(AnswerValue::Text(_)) => {
            debug!(
                "question {} ({}) holds a single value; ignoring",
                question.id, question.question_type
            );
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn control_for(question: &Question, store: &AnswerStore) -> Control {
    let options = question.options.clone();
    match question.question_type {
        QuestionType::ShortText
        | QuestionType::Number
        | QuestionType::Url
        | QuestionType::Email
        | QuestionType::Date => Control::TextLine {
            value: text_value(question, store),
        },
        QuestionType::LongText => Control::TextArea {
            value: text_value(question, store),
        },
        QuestionType::SingleChoice => Control::ChoiceGroup {
            options,
            selected: text_value(question, store),
        },
        QuestionType::MultiChoice => Control::CheckGroup {
            options,
            selected: selection_values(question, store),
        },
        QuestionType::Dropdown => Control::Dropdown {
            options,
            selected: text_value(question, store),
        },
        QuestionType::Boolean => Control::Toggle {
            on: text_value(question, store).map(|text| text == "true"),
        },
    }
}

/// Produce one widget per question, in `form.questions` order.
///
/// Questions are never filtered or reordered, and answers stored under
/// removed question IDs are never shown. The form is checked defensively
/// first; a malformed form is an error, not a best-effort render.
pub fn render(form: &Form, store: &AnswerStore, mode: RenderMode) -> Result<Vec<Widget>, SchemaError> {
    form.validate()?;
    Ok(form
        .questions
        .iter()
        .map(|question| Widget {
            question: question.id,
            label: question.label.clone(),
            required: question.required,
            editable: mode.is_editable(),
            control: control_for(question, store),
        })
        .collect())
}
