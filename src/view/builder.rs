use std::ops::{Deref, DerefMut};

use log::debug;

use crate::builder::FormBuilder;
use crate::error::{Error, Result};
use crate::model::answer::AnswerStore;
use crate::model::id::Id;
use crate::render::{render, RenderMode, Widget};
use crate::store::PersistenceAdapter;

/// The draft editing surface handed to the host UI.
///
/// Dereferences to [`FormBuilder`] for all local editing operations; adds
/// the cross-boundary concerns: loading, guarded saving, and preview.
#[derive(Debug)]
pub struct BuilderView {
    builder: FormBuilder,
    saving: bool,
    mounted: bool,
}

impl BuilderView {
    /// Open the builder on a blank draft.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_builder(FormBuilder::new(title))
    }

    /// Open the builder on an existing form, fetched once on entry.
    pub async fn load<A>(adapter: &A, form_id: Id) -> Result<Self>
    where
        A: PersistenceAdapter + ?Sized,
    {
        let form = adapter
            .form(form_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Form {form_id}")))?;
        Ok(Self::with_builder(FormBuilder::from_form(&form)))
    }

    fn with_builder(builder: FormBuilder) -> Self {
        Self {
            builder,
            saving: false,
            mounted: true,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The view is being navigated away from. An in-flight save may still
    /// complete against the store, but its result no longer touches this
    /// view.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Render the current draft without accepting input.
    pub fn preview(&self, answers: &AnswerStore) -> Result<Vec<Widget>> {
        Ok(render(&self.builder.draft(), answers, RenderMode::Preview)?)
    }

    /// Persist the draft. Re-invocation while a save is in flight is
    /// refused rather than double-submitted.
    pub async fn save<A>(&mut self, adapter: &A) -> Result<Id>
    where
        A: PersistenceAdapter + ?Sized,
    {
        if self.saving {
            return Err(Error::SaveInFlight);
        }
        self.saving = true;

        let outcome = self.builder.save(adapter).await;

        if self.mounted {
            self.saving = false;
        } else {
            debug!("builder view unmounted during save; result dropped");
        }
        outcome
    }
}

impl Deref for BuilderView {
    type Target = FormBuilder;

    fn deref(&self) -> &Self::Target {
        &self.builder
    }
}

impl DerefMut for BuilderView {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.builder
    }
}

#[cfg(test)]
mod tests {
    use crate::model::form::Form;
    use crate::store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn load_fetches_the_stored_form() {
        let store = MemoryStore::new();
        let form = Form::example();
        let id = form.id;
        store.upsert_form(form).await.unwrap();

        let view = BuilderView::load(&store, id).await.unwrap();
        assert_eq!(view.form_id(), id);
        assert_eq!(view.title(), "Club membership");
    }

    #[tokio::test]
    async fn load_missing_form_is_not_found() {
        let store = MemoryStore::new();
        let result = BuilderView::load(&store, Id::new()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn preview_is_never_editable() {
        let store = MemoryStore::new();
        let form = Form::example();
        let id = form.id;
        store.upsert_form(form).await.unwrap();

        let view = BuilderView::load(&store, id).await.unwrap();
        let widgets = view.preview(&AnswerStore::new()).unwrap();
        assert!(!widgets.is_empty());
        assert!(widgets.iter().all(|widget| !widget.editable));
    }

    #[tokio::test]
    async fn editing_through_the_view_reaches_the_draft() {
        let mut view = BuilderView::new("Via view");
        let question = view.active_question().unwrap();
        view.set_label(question, "Edited through deref").unwrap();
        view.save(&MemoryStore::new()).await.unwrap();
        assert!(!view.is_saving());
    }

    #[tokio::test]
    async fn unmounted_save_result_is_dropped() {
        let store = MemoryStore::new();
        let mut view = BuilderView::new("Unmounted");
        let question = view.active_question().unwrap();
        view.set_label(question, "Some label").unwrap();

        view.unmount();
        // The in-flight write is allowed to complete against the store...
        view.save(&store).await.unwrap();
        assert_eq!(store.form_count(), 1);
        // ...but the view's own state is no longer updated, so a further
        // save is still refused as in-flight.
        assert!(view.is_saving());
        assert!(matches!(
            view.save(&store).await,
            Err(Error::SaveInFlight)
        ));
    }
}
