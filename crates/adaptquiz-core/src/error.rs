//! Error types for the session engine and question banks.
//!
//! Invalid state-machine calls are not errors: those operations return a
//! value describing whether they had an effect. Only precondition failures
//! the caller must surface live here.

use thiserror::Error;

/// Errors raised by session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Filtering the bank left nothing to ask; the session was not started.
    #[error("no questions available for category '{category}'")]
    NoQuestionsAvailable { category: String },

    /// The configured pool range cannot produce a question.
    #[error("invalid pool size {min}..={max}: min must be at least 1 and not exceed max")]
    InvalidPoolSize { min: usize, max: usize },
}

/// A question or bank that violates the data-model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// Two questions share an id.
    #[error("duplicate question ID: {0}")]
    DuplicateId(String),

    /// The question has no answer options.
    #[error("question {0} has no options")]
    NoOptions(String),

    /// No option is marked correct.
    #[error("question {0} has no correct option")]
    NoCorrectOption(String),

    /// More than one option is marked correct.
    #[error("question {id} has {count} correct options, expected exactly one")]
    MultipleCorrectOptions { id: String, count: usize },

    /// Two options within one question share an id.
    #[error("question {question_id} repeats option ID '{option_id}'")]
    DuplicateOptionId {
        question_id: String,
        option_id: String,
    },

    /// The prompt is blank.
    #[error("question {0} has empty text")]
    EmptyText(String),
}

impl BankError {
    /// The id of the offending question.
    pub fn question_id(&self) -> &str {
        match self {
            BankError::DuplicateId(id)
            | BankError::NoOptions(id)
            | BankError::NoCorrectOption(id)
            | BankError::EmptyText(id) => id,
            BankError::MultipleCorrectOptions { id, .. } => id,
            BankError::DuplicateOptionId { question_id, .. } => question_id,
        }
    }
}

/// A difficulty value outside 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("difficulty {0} is outside 1..=5")]
pub struct DifficultyError(pub u8);
