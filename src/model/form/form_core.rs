use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::model::form::{Question, Schedule};
use crate::model::id::Id;

/// An authored form: its ordered questions plus submission schedule.
///
/// Created and mutated only by the builder; the renderer and gate never
/// change it. `version` is the optimistic-concurrency stamp checked by
/// `PersistenceAdapter::upsert_form`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Form unique ID.
    pub id: Id,
    /// Form title.
    pub title: String,
    /// Description shown above the questions.
    #[serde(default)]
    pub description: String,
    /// The questions, in presentation order.
    pub questions: Vec<Question>,
    /// Submission window.
    #[serde(flatten)]
    pub schedule: Schedule,
    /// Revision stamp; bumped by the store on every accepted write.
    #[serde(default)]
    pub version: u64,
}

impl Form {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            title: title.into(),
            description: String::new(),
            questions: Vec::new(),
            schedule: Schedule::default(),
            version: 0,
        }
    }

    /// Look up a question by ID.
    pub fn question(&self, id: Id) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// All schema violations in this form: every failing question in order,
    /// plus one violation per duplicated question ID.
    pub fn violations(&self) -> Vec<SchemaError> {
        let mut violations = Vec::new();
        for question in &self.questions {
            violations.extend(question.violations());
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id) {
                violations.push(SchemaError::DuplicateId { id: question.id });
            }
        }

        violations
    }

    /// Check the whole form is well-formed, failing with the first violation.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self.violations().into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::model::form::QuestionType;

    use super::*;

    impl Form {
        /// A valid two-question form that is currently open.
        pub fn example() -> Self {
            Self {
                questions: vec![Question::example(), Question::choice_example()],
                schedule: Schedule::window(
                    Utc::now() - Duration::days(1),
                    Utc::now() + Duration::days(1),
                ),
                ..Self::new("Club membership")
            }
        }

        /// A valid form whose window has not opened yet.
        pub fn future_example() -> Self {
            Self {
                schedule: Schedule::window(
                    Utc::now() + Duration::days(1),
                    Utc::now() + Duration::days(2),
                ),
                ..Self::example()
            }
        }
    }

    #[test]
    fn example_is_valid() {
        assert_eq!(Form::example().validate(), Ok(()));
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let mut form = Form::example();
        let mut copy = form.questions[0].clone();
        copy.label = "A different question, same id".to_string();
        form.questions.push(copy);

        let id = form.questions[0].id;
        assert_eq!(form.validate(), Err(SchemaError::DuplicateId { id }));
    }

    #[test]
    fn violations_follow_question_order() {
        let mut form = Form::example();
        form.questions[0].label = String::new();
        form.questions[1].options.clear();

        let violations = form.violations();
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], SchemaError::EmptyLabel { .. }));
        assert!(matches!(violations[1], SchemaError::NoOptions { .. }));
    }

    #[test]
    fn serde_round_trip() {
        let form = Form::example();
        let json = serde_json::to_string(&form).unwrap();
        let back: Form = serde_json::from_str(&json).unwrap();
        assert_eq!(form, back);
    }

    #[test]
    fn options_omitted_when_empty() {
        let form = Form {
            questions: vec![Question::new(
                Id::new(),
                "Plain text",
                QuestionType::ShortText,
            )],
            ..Form::new("No options")
        };
        let json = serde_json::to_string(&form).unwrap();
        assert!(!json.contains("options"));
    }
}
