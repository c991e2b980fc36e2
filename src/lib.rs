//! The dynamic form engine behind our community platform client: a schema
//! model for user-definable forms, a builder for authoring them, a renderer
//! interpreting one schema for both preview and live submission, and a
//! submission gate keyed on time window and participant role.
//!
//! This is a library consumed by page-level views; authentication, routing,
//! page chrome and the persistence backend itself live with the host. The
//! store is reached exclusively through [`store::PersistenceAdapter`].

pub mod builder;
pub mod error;
pub mod gate;
pub mod model;
pub mod render;
pub mod store;
pub mod view;

pub use builder::FormBuilder;
pub use error::{Error, GateError, Result, SchemaError};
pub use gate::GateState;
pub use model::answer::{AnswerSet, AnswerStore, AnswerValue, SubmissionStatus};
pub use model::collection::{Keyed, MoveTarget, OrderedCollection};
pub use model::form::{Form, Question, QuestionType, Schedule};
pub use model::id::Id;
pub use model::role::{Enrollment, ParticipantRole};
pub use render::{render, Control, RenderMode, Widget};
pub use store::{AdapterError, EnrollmentProvider, MemoryStore, PersistenceAdapter};
pub use view::{BuilderView, SubmissionView};
