use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use crate::model::answer::AnswerSet;
use crate::model::form::Form;
use crate::model::id::Id;
use crate::model::role::Enrollment;

use super::{AdapterError, EnrollmentProvider, PersistenceAdapter};

/// An in-memory store implementing both external interfaces.
///
/// Backs the engine's tests and demo hosts. Enforces the same contract a
/// real adapter must: whole-record upserts and version-stamp conflict
/// rejection for forms.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forms: Mutex<HashMap<Id, Form>>,
    answers: Mutex<HashMap<(Id, Id), AnswerSet>>,
    enrollments: Mutex<HashMap<(Id, Id), Enrollment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enrollment for a (form, respondent) pair.
    pub fn enroll(&self, form_id: Id, respondent: Id, enrollment: Enrollment) {
        self.enrollments
            .lock()
            .unwrap()
            .insert((form_id, respondent), enrollment);
    }

    /// Number of stored answer sets, across all forms and respondents.
    pub fn answer_set_count(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    /// Number of stored forms.
    pub fn form_count(&self) -> usize {
        self.forms.lock().unwrap().len()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn form(&self, id: Id) -> Result<Option<Form>, AdapterError> {
        Ok(self.forms.lock().unwrap().get(&id).cloned())
    }

    async fn upsert_form(&self, mut form: Form) -> Result<Id, AdapterError> {
        let mut forms = self.forms.lock().unwrap();
        if let Some(existing) = forms.get(&form.id) {
            if existing.version != form.version {
                debug!(
                    "rejecting stale write for form {}: stored v{}, presented v{}",
                    form.id, existing.version, form.version
                );
                return Err(AdapterError::Conflict { form: form.id });
            }
        }
        form.version += 1;
        let id = form.id;
        forms.insert(id, form);
        Ok(id)
    }

    async fn answer_set(
        &self,
        form_id: Id,
        respondent: Id,
    ) -> Result<Option<AnswerSet>, AdapterError> {
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(&(form_id, respondent))
            .cloned())
    }

    async fn upsert_answer_set(&self, set: AnswerSet) -> Result<Id, AdapterError> {
        let id = set.id;
        self.answers
            .lock()
            .unwrap()
            .insert((set.form_id, set.respondent), set);
        Ok(id)
    }
}

#[async_trait]
impl EnrollmentProvider for MemoryStore {
    async fn enrollment(&self, form_id: Id, respondent: Id) -> Result<Enrollment, AdapterError> {
        Ok(self
            .enrollments
            .lock()
            .unwrap()
            .get(&(form_id, respondent))
            .copied()
            .unwrap_or_else(Enrollment::individual))
    }
}
