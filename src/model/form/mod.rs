//! The schema model: pure form/question data plus invariant checks.

mod form_core;
mod question;
mod schedule;

pub use form_core::Form;
pub use question::{Question, QuestionType};
pub use schedule::Schedule;
