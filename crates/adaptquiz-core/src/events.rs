//! Notifications emitted by session transitions.
//!
//! Observers see what happened (feedback toasts, difficulty changes) but
//! the session never depends on whether anything is listening.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::model::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Started {
        category: String,
        total_questions: usize,
    },
    QuestionPresented {
        question_id: String,
        difficulty: Difficulty,
        /// 1-based position of this question within the session.
        number: usize,
    },
    Answered {
        question_id: String,
        option_id: String,
        correct: bool,
        xp_gained: u32,
        streak: u32,
    },
    StreakBonus {
        streak: u32,
        xp: u32,
    },
    HintUsed {
        question_id: String,
        cost: u32,
    },
    HintUnavailable {
        question_id: String,
    },
    TimedOut {
        question_id: String,
    },
    DifficultyChanged {
        from: Difficulty,
        to: Difficulty,
    },
    Finished {
        answered: u32,
        correct: u32,
        xp: u32,
    },
}

/// Receives session events.
pub trait SessionObserver: Send {
    fn on_event(&self, event: &SessionEvent);
}

/// Ignores every event.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_event(&self, _: &SessionEvent) {}
}

/// Collects events for later inspection. Clones share one buffer.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event recorded so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<SessionEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl SessionObserver for RecordingObserver {
    fn on_event(&self, event: &SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
