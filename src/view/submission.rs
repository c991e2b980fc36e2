use chrono::{DateTime, Utc};
use log::debug;

use crate::error::{Error, GateError, Result};
use crate::gate::{submit_answers, GateState};
use crate::model::answer::{AnswerSet, AnswerStore, AnswerValue};
use crate::model::form::Form;
use crate::model::id::Id;
use crate::model::role::{Enrollment, ParticipantRole};
use crate::render::{render, Widget};
use crate::store::{EnrollmentProvider, PersistenceAdapter};

/// The respondent-facing surface: a rendered form bound to the gate.
///
/// Loading fetches everything once: the form, the viewer's enrollment, and
/// any existing answer set under the submission key (for a team member that
/// is the leader's shared record; members own no record of their own).
#[derive(Debug)]
pub struct SubmissionView {
    form: Form,
    respondent: Id,
    enrollment: Enrollment,
    key: Id,
    answers: AnswerStore,
    existing: Option<AnswerSet>,
    submitting: bool,
    mounted: bool,
}

impl SubmissionView {
    pub async fn load<A, E>(
        adapter: &A,
        enrollments: &E,
        form_id: Id,
        respondent: Id,
    ) -> Result<Self>
    where
        A: PersistenceAdapter + ?Sized,
        E: EnrollmentProvider + ?Sized,
    {
        let form = adapter
            .form(form_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Form {form_id}")))?;
        form.validate()?;

        let enrollment = enrollments.enrollment(form_id, respondent).await?;
        let key = enrollment.submission_key(respondent)?;
        let existing = adapter.answer_set(form_id, key).await?;
        let answers = existing
            .as_ref()
            .map(|set| AnswerStore::from_values(set.values.clone()))
            .unwrap_or_default();

        Ok(Self {
            form,
            respondent,
            enrollment,
            key,
            answers,
            existing,
            submitting: false,
            mounted: true,
        })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn respondent(&self) -> Id {
        self.respondent
    }

    pub fn role(&self) -> ParticipantRole {
        self.enrollment.role
    }

    /// The stored answer set this view observes, if any. For a member this
    /// is the leader's shared submission.
    pub fn existing(&self) -> Option<&AnswerSet> {
        self.existing.as_ref()
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    /// The gate state at the given instant.
    pub fn state(&self, now: DateTime<Utc>) -> GateState {
        GateState::evaluate(now, &self.form.schedule, self.enrollment.role)
    }

    /// Render the form with the mode the gate dictates.
    pub fn widgets(&self, now: DateTime<Utc>) -> Result<Vec<Widget>> {
        Ok(render(&self.form, &self.answers, self.state(now).render_mode())?)
    }

    /// Overwrite an answer. Refused while the gate is closed and for
    /// questions not on the form.
    pub fn set(
        &mut self,
        now: DateTime<Utc>,
        question: Id,
        value: impl Into<AnswerValue>,
    ) -> Result<()> {
        self.check_writable(now, question)?;
        self.answers.set(question, value);
        Ok(())
    }

    /// Toggle one option of a multi-choice answer.
    pub fn toggle(
        &mut self,
        now: DateTime<Utc>,
        question: Id,
        option: &str,
        included: bool,
    ) -> Result<()> {
        self.check_writable(now, question)?;
        self.answers.toggle(question, option, included);
        Ok(())
    }

    /// Erase an answer.
    pub fn clear(&mut self, now: DateTime<Utc>, question: Id) -> Result<()> {
        self.check_writable(now, question)?;
        self.answers.clear(question);
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The view is being navigated away from; late results are dropped.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Submit the current answers through the gate. Returns the stored
    /// record's ID. Re-invocation while a submit is in flight is refused.
    pub async fn submit<A>(&mut self, adapter: &A, now: DateTime<Utc>) -> Result<Id>
    where
        A: PersistenceAdapter + ?Sized,
    {
        if self.submitting {
            return Err(Error::SaveInFlight);
        }
        self.submitting = true;

        let state = self.state(now);
        let outcome =
            submit_answers(adapter, &self.form, &self.answers, self.key, state, now).await;

        if !self.mounted {
            debug!("submission view unmounted during submit; result dropped");
            return outcome.map(|set| set.id);
        }
        self.submitting = false;
        let set = outcome?;
        let id = set.id;
        self.existing = Some(set);
        Ok(id)
    }

    fn check_writable(&self, now: DateTime<Utc>, question: Id) -> Result<()> {
        let state = self.state(now);
        if !state.is_open() {
            return Err(GateError::NotOpen { state }.into());
        }
        if self.form.question(question).is_none() {
            return Err(Error::not_found(format!("Question {question}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::model::role::Enrollment;
    use crate::store::MemoryStore;

    use super::*;

    /// Store with an open two-question form, a leader and a member sharing
    /// one team, and an individual respondent.
    async fn fixture() -> (MemoryStore, Id, Id, Id, Id) {
        let store = MemoryStore::new();
        let form = Form::example();
        let form_id = form.id;
        store.upsert_form(form).await.unwrap();

        let team = Id::new();
        let leader = Id::new();
        let member = Id::new();
        store.enroll(form_id, leader, Enrollment::leader(team));
        store.enroll(form_id, member, Enrollment::member(team));

        (store, form_id, team, leader, member)
    }

    fn answer_required(view: &mut SubmissionView, now: DateTime<Utc>, text: &str) {
        let required: Vec<Id> = view
            .form()
            .questions
            .iter()
            .filter(|question| question.required)
            .map(|question| question.id)
            .collect();
        for question in required {
            view.set(now, question, text).unwrap();
        }
    }

    #[tokio::test]
    async fn future_form_is_locked_and_rejects_writes() {
        let store = MemoryStore::new();
        let form = Form::future_example();
        let form_id = form.id;
        let question = form.questions[0].id;
        store.upsert_form(form).await.unwrap();

        let now = Utc::now();
        let mut view = SubmissionView::load(&store, &store, form_id, Id::new())
            .await
            .unwrap();

        assert_eq!(view.state(now), GateState::LockedFuture);
        let widgets = view.widgets(now).unwrap();
        assert!(widgets.iter().all(|widget| !widget.editable));

        assert!(matches!(
            view.set(now, question, "too early"),
            Err(Error::Gate(GateError::NotOpen { .. }))
        ));
        assert!(matches!(
            view.submit(&store, now).await,
            Err(Error::Gate(GateError::NotOpen {
                state: GateState::LockedFuture
            }))
        ));
        assert_eq!(store.answer_set_count(), 0);
    }

    #[tokio::test]
    async fn leader_submits_exactly_one_record() {
        let (store, form_id, team, leader, _) = fixture().await;
        let now = Utc::now();

        let mut view = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        assert_eq!(view.state(now), GateState::Open);
        assert!(view.existing().is_none());

        answer_required(&mut view, now, "leader's answer");
        view.submit(&store, now).await.unwrap();

        assert_eq!(store.answer_set_count(), 1);
        let stored = store.answer_set(form_id, team).await.unwrap().unwrap();
        assert_eq!(stored.respondent, team);
    }

    #[tokio::test]
    async fn member_is_locked_and_observes_the_leaders_record() {
        let (store, form_id, _, leader, member) = fixture().await;
        let now = Utc::now();

        let mut leader_view = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        answer_required(&mut leader_view, now, "shared answer");
        leader_view.submit(&store, now).await.unwrap();

        let mut member_view = SubmissionView::load(&store, &store, form_id, member)
            .await
            .unwrap();
        assert_eq!(member_view.state(now), GateState::LockedRole);

        // The member resolves the leader's record, not one of their own.
        let shared = member_view.existing().unwrap();
        assert!(shared
            .values
            .values()
            .any(|value| value == &AnswerValue::text("shared answer")));

        let question = member_view.form().questions[0].id;
        assert!(matches!(
            member_view.set(now, question, "member write"),
            Err(Error::Gate(GateError::NotOpen {
                state: GateState::LockedRole
            }))
        ));
        assert!(member_view.submit(&store, now).await.is_err());
        assert_eq!(store.answer_set_count(), 1);
    }

    #[tokio::test]
    async fn resubmitting_updates_the_same_record() {
        let (store, form_id, team, leader, _) = fixture().await;
        let now = Utc::now();

        let mut view = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        answer_required(&mut view, now, "first");
        let first = view.submit(&store, now).await.unwrap();

        answer_required(&mut view, now, "second");
        let second = view
            .submit(&store, now + Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.answer_set_count(), 1);
        let stored = store.answer_set(form_id, team).await.unwrap().unwrap();
        assert!(stored
            .values
            .values()
            .any(|value| value == &AnswerValue::text("second")));
    }

    #[tokio::test]
    async fn reloading_restores_previous_answers() {
        let (store, form_id, _, leader, _) = fixture().await;
        let now = Utc::now();

        let mut view = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        answer_required(&mut view, now, "persisted");
        view.submit(&store, now).await.unwrap();

        let reloaded = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        let required = reloaded
            .form()
            .questions
            .iter()
            .find(|question| question.required)
            .unwrap()
            .id;
        assert_eq!(
            reloaded.answers().get(required),
            Some(&AnswerValue::text("persisted"))
        );
    }

    #[tokio::test]
    async fn writes_to_unknown_questions_are_not_found() {
        let (store, form_id, _, leader, _) = fixture().await;
        let now = Utc::now();

        let mut view = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        assert!(matches!(
            view.set(now, Id::new(), "stray"),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unmounted_submit_result_is_dropped() {
        let (store, form_id, _, leader, _) = fixture().await;
        let now = Utc::now();

        let mut view = SubmissionView::load(&store, &store, form_id, leader)
            .await
            .unwrap();
        answer_required(&mut view, now, "in flight");
        view.unmount();

        // The write completes against the store but the view keeps none of
        // the result.
        view.submit(&store, now).await.unwrap();
        assert_eq!(store.answer_set_count(), 1);
        assert!(view.existing().is_none());
        assert!(view.is_submitting());
    }
}
