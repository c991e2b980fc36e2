use std::fmt::Display;

use thiserror::Error;

use crate::gate::GateState;
use crate::model::id::{Id, ParseIdError};
use crate::store::AdapterError;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the whole engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    IdParse(#[from] ParseIdError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("A save or submit for this view is already in flight")]
    SaveInFlight,
}

impl Error {
    /// Construct a `NotFound` error for the given missing thing.
    pub fn not_found(what: impl Display) -> Self {
        Self::NotFound(what.to_string())
    }
}

/// A malformed form or question. Blocks saving; each variant is one
/// inline-reportable violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("question {question} has an empty label")]
    EmptyLabel { question: Id },
    #[error("question {question} ({label:?}) is a choice type but has no options")]
    NoOptions { question: Id, label: String },
    #[error("question {question} ({label:?}) has a blank option")]
    BlankOption { question: Id, label: String },
    #[error("duplicate question id {id}")]
    DuplicateId { id: Id },
    #[error("a form must keep at least one question")]
    MinimumQuestions,
}

/// A submission attempted outside the `Open` gate state, or with required
/// questions unanswered. Never writes; shown as a banner by hosts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("submissions are not open: {state}")]
    NotOpen { state: GateState },
    #[error("{count} required question(s) have no answer")]
    RequiredMissing { count: usize },
}
