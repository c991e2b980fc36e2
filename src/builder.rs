//! Draft form editing: the authoring side of the engine.
//!
//! A builder session owns an exclusive local draft; the store is the single
//! point of serialization between concurrent editors of the same form.

use log::{info, warn};

use crate::error::{Error, Result, SchemaError};
use crate::model::collection::{Keyed, MoveTarget, OrderedCollection};
use crate::model::form::{Form, Question, QuestionType, Schedule};
use crate::model::id::Id;
use crate::store::PersistenceAdapter;

/// Seed text for the first option of a freshly converted choice question.
const DEFAULT_OPTION: &str = "Option 1";

/// One editable option row. Options get their own stable IDs while being
/// edited so reordering them never depends on their (duplicatable) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub id: Id,
    pub text: String,
}

impl Keyed for OptionEntry {
    fn key(&self) -> Id {
        self.id
    }
}

/// A question while it is being edited.
///
/// The options collection is kept whatever the current type; only
/// [`QuestionDraft::to_question`] decides whether it is emitted. Switching a
/// question away from a choice type and back therefore restores its options
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: Id,
    pub label: String,
    pub question_type: QuestionType,
    pub required: bool,
    options: OrderedCollection<OptionEntry>,
}

impl QuestionDraft {
    fn new(id: Id) -> Self {
        Self {
            id,
            label: String::new(),
            question_type: QuestionType::default(),
            required: false,
            options: OrderedCollection::new(),
        }
    }

    fn from_question(question: &Question) -> Self {
        let mut options = OrderedCollection::new();
        for text in &question.options {
            let id = options.fresh_id();
            options.push(OptionEntry {
                id,
                text: text.clone(),
            });
        }
        Self {
            id: question.id,
            label: question.label.clone(),
            question_type: question.question_type,
            required: question.required,
            options,
        }
    }

    /// The schema-model question this draft currently describes.
    pub fn to_question(&self) -> Question {
        Question {
            id: self.id,
            label: self.label.clone(),
            question_type: self.question_type,
            required: self.required,
            options: if self.question_type.uses_options() {
                self.options.iter().map(|entry| entry.text.clone()).collect()
            } else {
                Vec::new()
            },
        }
    }

    /// The option rows, shown only while the type uses them.
    pub fn options(&self) -> impl Iterator<Item = &OptionEntry> {
        self.options.iter()
    }

    /// Duplicate of this draft under a new ID, with fresh option row IDs.
    fn duplicate(&self, id: Id) -> Self {
        let mut options = OrderedCollection::new();
        for entry in self.options.iter() {
            let fresh = options.fresh_id();
            options.push(OptionEntry {
                id: fresh,
                text: entry.text.clone(),
            });
        }
        Self {
            id,
            label: self.label.clone(),
            question_type: self.question_type,
            required: self.required,
            options,
        }
    }
}

impl Keyed for QuestionDraft {
    fn key(&self) -> Id {
        self.id
    }
}

/// Maintains a draft form and persists it all-or-nothing.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    form_id: Id,
    title: String,
    description: String,
    schedule: Schedule,
    version: u64,
    questions: OrderedCollection<QuestionDraft>,
    active: Option<Id>,
}

impl FormBuilder {
    /// Start a blank draft. Every form keeps at least one question, so the
    /// draft is seeded with one (selected as active).
    pub fn new(title: impl Into<String>) -> Self {
        let mut builder = Self {
            form_id: Id::new(),
            title: title.into(),
            description: String::new(),
            schedule: Schedule::default(),
            version: 0,
            questions: OrderedCollection::new(),
            active: None,
        };
        builder.add_question();
        builder
    }

    /// Edit an existing form.
    pub fn from_form(form: &Form) -> Self {
        let questions = form.questions.iter().map(QuestionDraft::from_question).collect();
        Self {
            form_id: form.id,
            title: form.title.clone(),
            description: form.description.clone(),
            schedule: form.schedule,
            version: form.version,
            questions,
            active: form.questions.first().map(|question| question.id),
        }
    }

    pub fn form_id(&self) -> Id {
        self.form_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
    }

    pub fn questions(&self) -> impl Iterator<Item = &QuestionDraft> {
        self.questions.iter()
    }

    pub fn question(&self, id: Id) -> Option<&QuestionDraft> {
        self.questions.get(id)
    }

    /// The question currently selected in the option editor panel.
    pub fn active_question(&self) -> Option<Id> {
        self.active
    }

    pub fn set_active(&mut self, id: Id) -> Result<()> {
        if !self.questions.contains(id) {
            return Err(Error::not_found(format!("Question {id}")));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Append a fresh default question and select it.
    pub fn add_question(&mut self) -> Id {
        let id = self.questions.fresh_id();
        self.questions.push(QuestionDraft::new(id));
        self.active = Some(id);
        id
    }

    /// Remove a question. The last remaining question cannot be removed.
    pub fn remove_question(&mut self, id: Id) -> Result<()> {
        if self.questions.len() == 1 && self.questions.contains(id) {
            return Err(SchemaError::MinimumQuestions.into());
        }
        self.questions.remove_item(id)?;
        if self.active == Some(id) {
            self.active = self.questions.ids().next();
        }
        Ok(())
    }

    /// Clone a question (fresh IDs throughout) directly after its source.
    pub fn duplicate_question(&mut self, id: Id) -> Result<Id> {
        let new_id = self
            .questions
            .duplicate_item(id, |source, fresh| source.duplicate(fresh))?;
        self.active = Some(new_id);
        Ok(new_id)
    }

    /// Reorder a question; presentation order is exactly draft order.
    pub fn move_question(&mut self, id: Id, target: MoveTarget) -> Result<()> {
        self.questions = self.questions.move_item(id, target)?;
        Ok(())
    }

    pub fn set_label(&mut self, id: Id, label: impl Into<String>) -> Result<()> {
        let question = self.question_mut(id)?;
        question.label = label.into();
        Ok(())
    }

    pub fn set_required(&mut self, id: Id, required: bool) -> Result<()> {
        let question = self.question_mut(id)?;
        question.required = required;
        Ok(())
    }

    /// Change a question's input type.
    ///
    /// Converting to a choice type seeds one default option if none are
    /// retained from a previous conversion; converting away keeps the
    /// existing options hidden so the change can be reverted losslessly.
    pub fn change_type(&mut self, id: Id, new_type: QuestionType) -> Result<()> {
        let question = self.question_mut(id)?;
        if question.question_type == new_type {
            return Ok(());
        }
        // Changing the type once submissions reference this question is a
        // compatibility hazard the builder cannot check locally.
        warn!(
            "question {id} changes type {} -> {new_type}; existing answers keep their old shape",
            question.question_type
        );
        question.question_type = new_type;
        if new_type.uses_options() && question.options.is_empty() {
            let option_id = question.options.fresh_id();
            question.options.push(OptionEntry {
                id: option_id,
                text: DEFAULT_OPTION.to_string(),
            });
        }
        Ok(())
    }

    /// Append an option row to a question, returning the row ID.
    pub fn add_option(&mut self, question: Id, text: impl Into<String>) -> Result<Id> {
        let question = self.question_mut(question)?;
        let id = question.options.fresh_id();
        question.options.push(OptionEntry {
            id,
            text: text.into(),
        });
        Ok(id)
    }

    pub fn rename_option(&mut self, question: Id, option: Id, text: impl Into<String>) -> Result<()> {
        let question = self.question_mut(question)?;
        let entry = question
            .options
            .get_mut(option)
            .ok_or_else(|| Error::not_found(format!("Option {option}")))?;
        entry.text = text.into();
        Ok(())
    }

    pub fn remove_option(&mut self, question: Id, option: Id) -> Result<()> {
        let question = self.question_mut(question)?;
        question.options.remove_item(option)?;
        Ok(())
    }

    pub fn move_option(&mut self, question: Id, option: Id, target: MoveTarget) -> Result<()> {
        let question = self.question_mut(question)?;
        question.options = question.options.move_item(option, target)?;
        Ok(())
    }

    /// Materialise the current draft as a schema-model form.
    pub fn draft(&self) -> Form {
        Form {
            id: self.form_id,
            title: self.title.clone(),
            description: self.description.clone(),
            questions: self.questions.iter().map(QuestionDraft::to_question).collect(),
            schedule: self.schedule,
            version: self.version,
        }
    }

    /// All schema violations currently blocking a save.
    pub fn violations(&self) -> Vec<SchemaError> {
        self.draft().violations()
    }

    /// Validate and persist the draft as one atomic write.
    ///
    /// On any schema violation nothing is written and the first violation is
    /// returned (the full list stays available via [`Self::violations`]). A
    /// successful write leaves the draft tracking the stored revision.
    pub async fn save<A>(&mut self, adapter: &A) -> Result<Id>
    where
        A: PersistenceAdapter + ?Sized,
    {
        let form = self.draft();
        if let Some(violation) = form.violations().into_iter().next() {
            return Err(violation.into());
        }

        info!("saving form {} (v{})", form.id, form.version);
        let id = adapter.upsert_form(form).await?;
        // The store bumped the accepted revision; track it locally so the
        // next save presents the current stamp.
        self.version += 1;
        Ok(id)
    }

    fn question_mut(&mut self, id: Id) -> Result<&mut QuestionDraft> {
        self.questions
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("Question {id}")))
    }
}
