//! adaptquiz-core: Adaptive quiz session engine.
//!
//! This crate defines the question model, bank loading, and the session
//! state machine that samples a pool, scores answers, and recalibrates
//! difficulty from accuracy and an engagement signal. It has no notion of
//! wall-clock time; see `adaptquiz-runtime` for the driver that ticks it.

pub mod adapter;
pub mod bank;
pub mod clock;
pub mod config;
pub mod engagement;
pub mod error;
pub mod events;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod statistics;

pub use bank::QuestionBank;
pub use config::SessionConfig;
pub use error::{BankError, SessionError};
pub use model::{AnswerOption, CategoryFilter, Difficulty, Question, QuestionKind};
pub use report::SessionSummary;
pub use session::{Progress, Session, SessionStatus, Tick};
