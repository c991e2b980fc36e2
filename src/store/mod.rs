//! The seam to the hosted data store and enrollment service.
//!
//! The engine never owns persistence; it consumes these traits. Adapter
//! failures are retryable by explicit user action only; nothing is rolled
//! back locally because nothing local is optimistically mutated for a
//! cross-boundary call.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::answer::AnswerSet;
use crate::model::form::Form;
use crate::model::id::Id;
use crate::model::role::Enrollment;

pub use memory::MemoryStore;

/// A storage-side failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Network or storage failure; retryable by the user.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The write carried a stale revision stamp; someone else saved first.
    /// Reload and retry.
    #[error("form {form} was changed by someone else since it was loaded")]
    Conflict { form: Id },
    /// The stored or enrollment data is undecodable or inconsistent.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

/// Generic query/update access to the hosted data store.
///
/// Upserts are whole-record and atomic: a partially written form or answer
/// set is unrepresentable through this interface. `upsert_form` must reject
/// a write whose `version` does not match the stored record's
/// ([`AdapterError::Conflict`]) and bump the stored version on acceptance.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Fetch a form by ID.
    async fn form(&self, id: Id) -> Result<Option<Form>, AdapterError>;

    /// Insert or replace a form, returning its ID.
    async fn upsert_form(&self, form: Form) -> Result<Id, AdapterError>;

    /// Fetch the answer set stored under the given key (respondent or team).
    async fn answer_set(&self, form_id: Id, respondent: Id)
        -> Result<Option<AnswerSet>, AdapterError>;

    /// Insert or replace an answer set, returning its ID.
    async fn upsert_answer_set(&self, set: AnswerSet) -> Result<Id, AdapterError>;
}

/// Read access to enrollment data owned by an external collaborator.
#[async_trait]
pub trait EnrollmentProvider: Send + Sync {
    /// Resolve the respondent's enrollment for a form. Respondents unknown
    /// to the collaborator participate as individuals.
    async fn enrollment(&self, form_id: Id, respondent: Id) -> Result<Enrollment, AdapterError>;
}
