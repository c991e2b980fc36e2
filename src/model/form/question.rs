use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::model::collection::Keyed;
use crate::model::id::Id;

/// The input type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    ShortText,
    LongText,
    SingleChoice,
    MultiChoice,
    Dropdown,
    Number,
    Url,
    Email,
    Date,
    Boolean,
}

impl QuestionType {
    /// Whether this type draws its answers from an options list.
    pub fn uses_options(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice | Self::Dropdown)
    }

    /// Whether answers to this type hold several selections at once.
    pub fn is_multi_valued(self) -> bool {
        self == Self::MultiChoice
    }
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::ShortText
    }
}

impl Display for QuestionType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::Dropdown => "dropdown",
            Self::Number => "number",
            Self::Url => "url",
            Self::Email => "email",
            Self::Date => "date",
            Self::Boolean => "boolean",
        };
        write!(formatter, "{name}")
    }
}

/// A single question within a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question unique ID, stable for the lifetime of the form.
    pub id: Id,
    /// Question text shown to respondents.
    pub label: String,
    /// Input type.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Whether an answer is mandatory for submission.
    #[serde(default)]
    pub required: bool,
    /// Possible answers, present only for the choice types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Question {
    pub fn new(id: Id, label: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            id,
            label: label.into(),
            question_type,
            required: false,
            options: Vec::new(),
        }
    }

    /// All violations in this question, in reporting order.
    pub fn violations(&self) -> Vec<SchemaError> {
        let mut violations = Vec::new();
        if self.label.trim().is_empty() {
            violations.push(SchemaError::EmptyLabel { question: self.id });
        }
        if self.question_type.uses_options() {
            if self.options.is_empty() {
                violations.push(SchemaError::NoOptions {
                    question: self.id,
                    label: self.label.clone(),
                });
            } else if self.options.iter().any(|option| option.trim().is_empty()) {
                violations.push(SchemaError::BlankOption {
                    question: self.id,
                    label: self.label.clone(),
                });
            }
        }
        violations
    }

    /// Check this question is well-formed, failing with the first violation.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self.violations().into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}

impl Keyed for Question {
    fn key(&self) -> Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Question {
        /// A valid required short-text question.
        pub fn example() -> Self {
            Self {
                required: true,
                ..Self::new(Id::new(), "What is your name?", QuestionType::ShortText)
            }
        }

        /// A valid single-choice question with two options.
        pub fn choice_example() -> Self {
            Self {
                options: vec!["Quidditch".to_string(), "Chess".to_string()],
                ..Self::new(Id::new(), "Favourite club?", QuestionType::SingleChoice)
            }
        }
    }

    #[test]
    fn valid_questions_pass() {
        assert_eq!(Question::example().validate(), Ok(()));
        assert_eq!(Question::choice_example().validate(), Ok(()));
    }

    #[test]
    fn empty_label_fails() {
        let mut question = Question::example();
        question.label = "   ".to_string();
        assert!(matches!(
            question.validate(),
            Err(SchemaError::EmptyLabel { .. })
        ));
    }

    #[test]
    fn choice_without_options_fails() {
        let mut question = Question::choice_example();
        question.options.clear();
        assert!(matches!(
            question.validate(),
            Err(SchemaError::NoOptions { .. })
        ));
    }

    #[test]
    fn blank_option_fails() {
        let mut question = Question::choice_example();
        question.options.push(String::new());
        assert!(matches!(
            question.validate(),
            Err(SchemaError::BlankOption { .. })
        ));
    }

    #[test]
    fn non_choice_ignores_options() {
        // Options retained from a previous type are legal on a text question;
        // they are simply not rendered.
        let mut question = Question::example();
        question.options = vec!["stale".to_string()];
        assert_eq!(question.validate(), Ok(()));
    }

    #[test]
    fn type_names_are_snake_case() {
        let json = serde_json::to_string(&QuestionType::MultiChoice).unwrap();
        assert_eq!(json, "\"multi_choice\"");
        assert_eq!(QuestionType::ShortText.to_string(), "short_text");
    }
}
