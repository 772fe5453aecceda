//! The quiz session state machine.
//!
//! A [`Session`] owns the sampled pool, the counters, the clock and the
//! engagement reading, and is the only thing that mutates them. It moves
//! through `NotStarted -> InProgress -> Finished`; `reset` returns to
//! `NotStarted` from anywhere.
//!
//! Nothing here schedules work. Callers drive [`Session::tick_clock`] and
//! [`Session::tick_engagement`] at the configured periods (see the
//! `adaptquiz-runtime` crate) and forward learner actions. Calls that are
//! invalid in the current state have no effect and report that in their
//! return value.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapter::DifficultyAdapter;
use crate::bank::QuestionBank;
use crate::clock::{ClockTick, SessionClock};
use crate::config::SessionConfig;
use crate::engagement::{EngagementReading, EngagementSimulator, EngagementSource};
use crate::error::SessionError;
use crate::events::{NoopObserver, SessionEvent, SessionObserver};
use crate::model::{CategoryFilter, Difficulty, Question};
use crate::report::{SessionSummary, SummaryInput};
use crate::scoring::{AnswerScore, HintPolicy, ScoringEngine};
use crate::selector::{self, Selection};
use crate::statistics::{AnswerOutcome, AnswerRecord};

// Keeps the engagement stream independent of the selection stream.
const ENGAGEMENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// Result of moving past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Not valid in the current state; nothing changed.
    Ignored,
    /// A new current question is active.
    NextQuestion,
    /// The session reached `Finished`.
    Finished,
}

/// Result of a clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No question is counting down.
    Idle,
    /// Seconds left after this tick.
    Running(u32),
    /// Time ran out; the session moved on as if `advance` were called.
    Expired(Progress),
}

/// A serializable view of the observable session state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub category: Option<String>,
    pub question: Option<Question>,
    /// 1-based position of the current question.
    pub question_number: usize,
    pub selected_answer: Option<String>,
    pub answered: u32,
    pub correct: u32,
    pub total_questions: usize,
    pub xp: u32,
    pub streak: u32,
    pub time_left: u32,
    pub target_difficulty: Difficulty,
    pub reading: EngagementReading,
}

pub struct Session<R = StdRng> {
    bank: QuestionBank,
    config: SessionConfig,
    scoring: ScoringEngine,
    adapter: DifficultyAdapter,
    rng: R,
    engagement: Box<dyn EngagementSource>,
    observer: Box<dyn SessionObserver>,

    id: Uuid,
    status: SessionStatus,
    category: Option<CategoryFilter>,
    pool: Vec<Question>,
    current: Option<usize>,
    asked: HashSet<String>,
    answered: u32,
    correct: u32,
    selected: Option<String>,
    hints_on_current: u32,
    hints_total: u32,
    clock: SessionClock,
    xp: u32,
    streak: u32,
    best_streak: u32,
    target: Difficulty,
    reading: EngagementReading,
    history: Vec<AnswerRecord>,
    started_at: Option<DateTime<Utc>>,
    summary: Option<SessionSummary>,
}

impl Session<StdRng> {
    /// A session with entropy-seeded randomness and the simulated signal.
    pub fn new(bank: QuestionBank, config: SessionConfig) -> Self {
        Self::seeded(bank, config, rand::random())
    }

    /// A fully reproducible session.
    pub fn seeded(bank: QuestionBank, config: SessionConfig, seed: u64) -> Self {
        Self::with_parts(
            bank,
            config,
            StdRng::seed_from_u64(seed),
            Box::new(EngagementSimulator::new(seed ^ ENGAGEMENT_SEED_SALT)),
        )
    }
}

impl<R: Rng> Session<R> {
    pub fn with_parts(
        bank: QuestionBank,
        config: SessionConfig,
        rng: R,
        engagement: Box<dyn EngagementSource>,
    ) -> Self {
        let reading = engagement.baseline().clamped();
        Self {
            scoring: ScoringEngine::new(config.streak_bonus, config.hint_cost),
            adapter: DifficultyAdapter::new(config.recalibration_period),
            clock: SessionClock::new(config.timer_budget_secs),
            target: config.baseline_difficulty,
            bank,
            config,
            rng,
            engagement,
            observer: Box::new(NoopObserver),
            id: Uuid::nil(),
            status: SessionStatus::NotStarted,
            category: None,
            pool: Vec::new(),
            current: None,
            asked: HashSet::new(),
            answered: 0,
            correct: 0,
            selected: None,
            hints_on_current: 0,
            hints_total: 0,
            xp: 0,
            streak: 0,
            best_streak: 0,
            reading,
            history: Vec::new(),
            started_at: None,
            summary: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start a session over one category ("All" for no filter).
    pub fn start(&mut self, category: &str) -> Result<(), SessionError> {
        self.start_with(CategoryFilter::parse(category))
    }

    /// Start a session over a category filter.
    ///
    /// The pool is sampled before anything else changes: on failure the
    /// session is left exactly as it was, including a finished run's
    /// summary. On success any previous run is reset first.
    pub fn start_with(&mut self, filter: CategoryFilter) -> Result<(), SessionError> {
        let sampled = match self.bank.sample(
            &filter,
            self.config.pool_size,
            self.config.allow_short_pool,
            self.config.entry_max_difficulty,
            &mut self.rng,
        ) {
            Ok(sampled) => sampled,
            Err(e) => {
                tracing::warn!("cannot start session: {e}");
                return Err(e);
            }
        };

        self.reset();
        self.pool = sampled.questions;
        self.id = Uuid::new_v4();
        self.status = SessionStatus::InProgress;
        self.started_at = Some(Utc::now());
        tracing::info!(
            session = %self.id,
            category = %filter,
            drawn = sampled.drawn,
            pool = self.pool.len(),
            "session started"
        );
        self.emit(SessionEvent::Started {
            category: filter.label(),
            total_questions: self.pool.len(),
        });
        self.category = Some(filter);
        self.present(0);
        Ok(())
    }

    /// Answer the current question.
    ///
    /// Returns `None` without effect when not in progress, when the current
    /// question was already answered, or when `option_id` is not one of its
    /// options.
    pub fn answer(&mut self, option_id: &str) -> Option<AnswerScore> {
        if self.status != SessionStatus::InProgress || self.selected.is_some() {
            return None;
        }
        let question = self.current_question()?;
        let Some(option) = question.option(option_id) else {
            tracing::debug!(question = %question.id, option_id, "unknown option ignored");
            return None;
        };
        let correct = option.is_correct;
        let question_id = question.id.clone();
        let category = question.category.clone();
        let difficulty = question.difficulty;

        let time_left = self.clock.time_left();
        let score = self.scoring.score(correct, difficulty, time_left, self.streak);

        self.selected = Some(option_id.to_string());
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
        self.streak = score.streak;
        self.best_streak = self.best_streak.max(self.streak);
        self.xp = self.xp.saturating_add(score.total_xp());

        self.history.push(AnswerRecord {
            question_id: question_id.clone(),
            category,
            difficulty,
            option_id: Some(option_id.to_string()),
            outcome: if correct {
                AnswerOutcome::Correct
            } else {
                AnswerOutcome::Incorrect
            },
            xp_delta: score.total_xp(),
            time_left,
            hints_used: self.hints_on_current,
        });

        tracing::debug!(
            question = %question_id,
            correct,
            xp_gain = score.xp_gain,
            streak = score.streak,
            "answer recorded"
        );
        self.emit(SessionEvent::Answered {
            question_id,
            option_id: option_id.to_string(),
            correct,
            xp_gained: score.xp_gain,
            streak: score.streak,
        });
        if score.streak_bonus > 0 {
            self.emit(SessionEvent::StreakBonus {
                streak: score.streak,
                xp: score.streak_bonus,
            });
        }
        Some(score)
    }

    /// Move past the current question, answered or not.
    pub fn advance(&mut self) -> Progress {
        self.advance_leaving(AnswerOutcome::Skipped)
    }

    /// Finish early, keeping everything answered so far.
    pub fn end(&mut self) -> Progress {
        if self.status != SessionStatus::InProgress {
            return Progress::Ignored;
        }
        self.finish();
        Progress::Finished
    }

    /// Return to `NotStarted`, clearing the pool, counters and reading.
    pub fn reset(&mut self) {
        self.status = SessionStatus::NotStarted;
        self.category = None;
        self.pool.clear();
        self.current = None;
        self.asked.clear();
        self.answered = 0;
        self.correct = 0;
        self.selected = None;
        self.hints_on_current = 0;
        self.hints_total = 0;
        self.clock.reset();
        self.xp = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.target = self.config.baseline_difficulty;
        self.reading = self.engagement.baseline().clamped();
        self.history.clear();
        self.started_at = None;
        self.summary = None;
    }

    /// Reveal the current question's hint, debiting XP per the hint policy.
    ///
    /// `None` when not in progress, after answering, or when the question
    /// has no hint.
    pub fn use_hint(&mut self) -> Option<String> {
        if self.status != SessionStatus::InProgress || self.selected.is_some() {
            return None;
        }
        let question = self.current_question()?;
        let question_id = question.id.clone();
        let Some(hint) = question.hint_text().map(str::to_string) else {
            self.emit(SessionEvent::HintUnavailable { question_id });
            return None;
        };

        let charge = match self.config.hint_policy {
            HintPolicy::Repeatable => true,
            HintPolicy::OncePerQuestion => self.hints_on_current == 0,
        };
        let before = self.xp;
        if charge {
            self.xp = self.scoring.after_hint(self.xp);
        }
        self.hints_on_current += 1;
        self.hints_total += 1;

        self.emit(SessionEvent::HintUsed {
            question_id,
            cost: before - self.xp,
        });
        Some(hint)
    }

    /// Count down one second on the current question.
    ///
    /// Idle unless in progress with the current question unanswered. On
    /// expiry the streak resets and the session advances with no XP change.
    pub fn tick_clock(&mut self) -> Tick {
        if self.status != SessionStatus::InProgress || self.selected.is_some() {
            return Tick::Idle;
        }
        let Some(question_id) = self.current_question().map(|q| q.id.clone()) else {
            return Tick::Idle;
        };
        match self.clock.tick() {
            ClockTick::Running(left) => Tick::Running(left),
            ClockTick::Expired => {
                tracing::info!(question = %question_id, "time expired");
                self.streak = 0;
                self.emit(SessionEvent::TimedOut { question_id });
                Tick::Expired(self.advance_leaving(AnswerOutcome::TimedOut))
            }
        }
    }

    /// Refresh the engagement reading. `None` unless in progress.
    pub fn tick_engagement(&mut self) -> Option<EngagementReading> {
        if self.status != SessionStatus::InProgress {
            return None;
        }
        self.reading = self.engagement.next_reading().clamped();
        Some(self.reading)
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn category(&self) -> Option<&CategoryFilter> {
        self.category.as_ref()
    }

    pub fn pool(&self) -> &[Question] {
        &self.pool
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.and_then(|i| self.pool.get(i))
    }

    /// 1-based position of the current question, 0 when there is none.
    pub fn question_number(&self) -> usize {
        if self.current.is_some() {
            self.asked.len()
        } else {
            0
        }
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn answered_count(&self) -> u32 {
        self.answered
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn total_questions(&self) -> usize {
        self.pool.len()
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn reading(&self) -> EngagementReading {
        self.reading
    }

    pub fn target_difficulty(&self) -> Difficulty {
        self.target
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    /// Final aggregates; `Some` once finished.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            category: self.category.as_ref().map(CategoryFilter::label),
            question: self.current_question().cloned(),
            question_number: self.question_number(),
            selected_answer: self.selected.clone(),
            answered: self.answered,
            correct: self.correct,
            total_questions: self.pool.len(),
            xp: self.xp,
            streak: self.streak,
            time_left: self.clock.time_left(),
            target_difficulty: self.target,
            reading: self.reading,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn emit(&self, event: SessionEvent) {
        self.observer.on_event(&event);
    }

    fn present(&mut self, index: usize) {
        let Some(question) = self.pool.get(index) else {
            return;
        };
        let question_id = question.id.clone();
        let difficulty = question.difficulty;

        self.current = Some(index);
        self.asked.insert(question_id.clone());
        self.selected = None;
        self.hints_on_current = 0;
        self.clock.reset();

        tracing::debug!(question = %question_id, %difficulty, "question presented");
        self.emit(SessionEvent::QuestionPresented {
            question_id,
            difficulty,
            number: self.asked.len(),
        });
    }

    /// Leave the current question. Unanswered questions count as answered
    /// with `unanswered` as their outcome.
    fn advance_leaving(&mut self, unanswered: AnswerOutcome) -> Progress {
        if self.status != SessionStatus::InProgress {
            return Progress::Ignored;
        }
        let Some(question) = self.current_question() else {
            return Progress::Ignored;
        };

        if self.selected.is_none() {
            let record = AnswerRecord {
                question_id: question.id.clone(),
                category: question.category.clone(),
                difficulty: question.difficulty,
                option_id: None,
                outcome: unanswered,
                xp_delta: 0,
                time_left: self.clock.time_left(),
                hints_used: self.hints_on_current,
            };
            self.history.push(record);
            self.answered += 1;
        }

        if self.answered as usize >= self.pool.len() {
            self.finish();
            return Progress::Finished;
        }

        self.selected = None;
        self.clock.reset();
        self.recalibrate();

        let selection = selector::pick_next(&self.pool, &self.asked, self.target, &mut self.rng);
        let fallback = matches!(selection, Selection::Fallback(_));
        let next = selection
            .question()
            .and_then(|q| self.pool.iter().position(|p| p.id == q.id));

        match next {
            Some(index) => {
                if fallback {
                    tracing::debug!(difficulty = %self.target, "no adjacent question left, using fallback");
                }
                self.present(index);
                Progress::NextQuestion
            }
            None => {
                tracing::info!("pool exhausted before quota");
                self.finish();
                Progress::Finished
            }
        }
    }

    fn recalibrate(&mut self) {
        let Some(r) = self
            .adapter
            .check(self.target, self.correct, self.answered, &self.reading)
        else {
            return;
        };
        tracing::debug!(
            ratio = r.performance_ratio,
            attention = self.reading.attention,
            stress = self.reading.stress,
            "difficulty check"
        );
        if r.changed() {
            tracing::info!(
                "difficulty adjusted to: {} ({})",
                r.to.label(),
                r.to
            );
            self.target = r.to;
            self.emit(SessionEvent::DifficultyChanged {
                from: r.from,
                to: r.to,
            });
        }
    }

    fn finish(&mut self) {
        self.status = SessionStatus::Finished;
        self.current = None;
        self.selected = None;

        let summary = SessionSummary::new(SummaryInput {
            id: self.id,
            category: self
                .category
                .as_ref()
                .map(CategoryFilter::label)
                .unwrap_or_default(),
            started_at: self.started_at.unwrap_or_else(Utc::now),
            answered: self.answered,
            correct: self.correct,
            total_questions: self.pool.len(),
            xp: self.xp,
            streak: self.streak,
            best_streak: self.best_streak,
            final_difficulty: self.target,
            hints_used: self.hints_total,
            history: self.history.clone(),
        });

        tracing::info!(
            session = %self.id,
            answered = self.answered,
            correct = self.correct,
            xp = self.xp,
            "session finished"
        );
        self.emit(SessionEvent::Finished {
            answered: self.answered,
            correct: self.correct,
            xp: self.xp,
        });
        self.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolSize;
    use crate::engagement::FixedEngagement;
    use crate::events::RecordingObserver;
    use crate::model::fixtures::{question, with_hint};
    use crate::scoring::StreakBonusRule;

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            with_hint(question("1", "Art", 1), "Think primary."),
            question("2", "Science", 1),
            question("3", "Geography", 2),
            with_hint(question("4", "Programming", 3), "Plates."),
            question("5", "Biology", 2),
            question("6", "Programming", 3),
            question("7", "Technology", 2),
            with_hint(question("8", "Physics", 5), "Particles."),
            question("9", "Art", 1),
            question("10", "History", 3),
            question("11", "Geography", 1),
            question("12", "Science", 2),
            question("13", "Programming", 3),
        ])
        .unwrap()
    }

    fn fixed_pool_config(size: usize) -> SessionConfig {
        SessionConfig {
            pool_size: PoolSize {
                min: size,
                max: size,
            },
            ..SessionConfig::default()
        }
    }

    fn session_with(config: SessionConfig, reading: EngagementReading) -> Session {
        Session::with_parts(
            bank(),
            config,
            StdRng::seed_from_u64(11),
            Box::new(FixedEngagement(reading)),
        )
    }

    fn calm() -> EngagementReading {
        EngagementReading {
            attention: 85.0,
            relaxation: 60.0,
            stress: 20.0,
        }
    }

    fn correct_id(session: &Session) -> String {
        session
            .current_question()
            .and_then(|q| q.correct_option())
            .map(|o| o.id.clone())
            .unwrap()
    }

    fn wrong_id(session: &Session) -> String {
        session
            .current_question()
            .and_then(|q| q.options.iter().find(|o| !o.is_correct))
            .map(|o| o.id.clone())
            .unwrap()
    }

    fn assert_counters(session: &Session) {
        assert!(session.correct_count() <= session.answered_count());
        assert!(session.answered_count() as usize <= session.total_questions());
        assert!((1..=5).contains(&session.target_difficulty().get()));
    }

    #[test]
    fn start_presents_easy_entry_question() {
        for seed in 0..20 {
            let mut session = Session::seeded(bank(), SessionConfig::default(), seed);
            session.start("All").unwrap();
            assert_eq!(session.status(), SessionStatus::InProgress);
            assert!((5..=10).contains(&session.total_questions()));
            if session.pool().iter().any(|q| q.difficulty.get() <= 2) {
                assert!(session.current_question().unwrap().difficulty.get() <= 2);
            }
            assert_eq!(session.time_left(), 30);
            assert_eq!(session.target_difficulty().get(), 2);
            assert_eq!(session.question_number(), 1);
        }
    }

    #[test]
    fn start_unknown_category_stays_not_started() {
        let mut session = Session::seeded(bank(), SessionConfig::default(), 1);
        let err = session.start("Music").unwrap_err();
        assert!(matches!(err, SessionError::NoQuestionsAvailable { .. }));
        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn empty_pool_range_never_starts() {
        let mut session = session_with(fixed_pool_config(0), calm());
        let err = session.start("All").unwrap_err();
        assert_eq!(err, SessionError::InvalidPoolSize { min: 0, max: 0 });
        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert!(session.current_question().is_none());
        assert_eq!(session.advance(), Progress::Ignored);
    }

    #[test]
    fn inverted_pool_range_fails_to_start() {
        let config = SessionConfig {
            pool_size: PoolSize { min: 8, max: 3 },
            ..SessionConfig::default()
        };
        let mut session = session_with(config, calm());
        assert_eq!(
            session.start("All").unwrap_err(),
            SessionError::InvalidPoolSize { min: 8, max: 3 }
        );
        assert_eq!(session.status(), SessionStatus::NotStarted);
    }

    #[test]
    fn failed_restart_keeps_finished_run() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        let id = correct_id(&session);
        session.answer(&id);
        session.end();
        let xp = session.xp();

        assert!(session.start("Music").is_err());
        assert_eq!(session.status(), SessionStatus::Finished);
        assert_eq!(session.xp(), xp);
        assert_eq!(session.summary().unwrap().answered, 1);
    }

    #[test]
    fn small_category_rejected_when_short_pools_disallowed() {
        let config = SessionConfig {
            allow_short_pool: false,
            ..SessionConfig::default()
        };
        let mut session = Session::seeded(bank(), config, 2);
        assert!(session.start("Science").is_err());
        assert_eq!(session.status(), SessionStatus::NotStarted);

        let mut lenient = Session::seeded(bank(), SessionConfig::default(), 2);
        lenient.start("Science").unwrap();
        assert_eq!(lenient.total_questions(), 2);
    }

    #[test]
    fn correct_answer_scores_with_time_bonus() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        for _ in 0..10 {
            assert!(matches!(session.tick_clock(), Tick::Running(_)));
        }
        assert_eq!(session.time_left(), 20);

        let difficulty = session.current_question().unwrap().difficulty.get() as u32;
        let id = correct_id(&session);
        let score = session.answer(&id).unwrap();
        assert_eq!(score.xp_gain, 10 + difficulty * 5 + 4);
        assert_eq!(session.xp(), score.xp_gain);
        assert_eq!(session.streak(), 1);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.selected_answer(), Some(id.as_str()));
    }

    #[test]
    fn answering_twice_has_no_effect() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        let id = correct_id(&session);
        assert!(session.answer(&id).is_some());
        let xp = session.xp();
        assert!(session.answer(&id).is_none());
        assert!(session.answer(&wrong_id(&session)).is_none());
        assert_eq!(session.xp(), xp);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        assert!(session.answer("zz").is_none());
        assert!(session.selected_answer().is_none());
    }

    #[test]
    fn incorrect_answer_resets_streak() {
        let mut session = session_with(fixed_pool_config(6), calm());
        session.start("All").unwrap();
        let id = correct_id(&session);
        session.answer(&id);
        session.advance();
        let xp = session.xp();
        let wrong = wrong_id(&session);
        let score = session.answer(&wrong).unwrap();
        assert!(!score.correct);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.xp(), xp);
        assert_eq!(session.best_streak(), 1);
    }

    #[test]
    fn third_consecutive_correct_pays_streak_bonus() {
        let recorder = RecordingObserver::new();
        let mut session = session_with(fixed_pool_config(6), calm())
            .with_observer(Box::new(recorder.clone()));
        session.start("All").unwrap();

        let mut last = None;
        for _ in 0..3 {
            let id = correct_id(&session);
            last = session.answer(&id);
            session.advance();
        }
        let third = last.unwrap();
        assert_eq!(third.streak, 3);
        assert_eq!(third.streak_bonus, 15);
        assert!(recorder
            .events()
            .contains(&SessionEvent::StreakBonus { streak: 3, xp: 15 }));
    }

    #[test]
    fn prior_streak_rule_pays_on_fourth() {
        let config = SessionConfig {
            streak_bonus: StreakBonusRule::OnPrior,
            ..fixed_pool_config(6)
        };
        let mut session = session_with(config, calm());
        session.start("All").unwrap();
        let mut bonuses = Vec::new();
        for _ in 0..4 {
            let id = correct_id(&session);
            bonuses.push(session.answer(&id).unwrap().streak_bonus);
            session.advance();
        }
        assert_eq!(bonuses, vec![0, 0, 0, 15]);
    }

    #[test]
    fn advance_total_times_reaches_finished() {
        for seed in 0..10 {
            let mut session = Session::seeded(bank(), SessionConfig::default(), seed);
            session.start("All").unwrap();
            let total = session.total_questions();
            for i in 0..total {
                assert_eq!(session.status(), SessionStatus::InProgress, "step {i}");
                session.advance();
                assert_counters(&session);
            }
            assert_eq!(session.status(), SessionStatus::Finished);
            assert_eq!(session.answered_count() as usize, total);
            assert!(session.current_question().is_none());
            assert_eq!(session.advance(), Progress::Ignored);
        }
    }

    #[test]
    fn never_repeats_a_question() {
        let mut session = session_with(fixed_pool_config(10), calm());
        session.start("All").unwrap();
        let mut seen = HashSet::new();
        while let Some(q) = session.current_question() {
            assert!(seen.insert(q.id.clone()), "repeated {}", q.id);
            session.advance();
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn difficulty_rises_after_three_correct_with_attention() {
        let recorder = RecordingObserver::new();
        let mut session = session_with(fixed_pool_config(8), calm())
            .with_observer(Box::new(recorder.clone()));
        session.start("All").unwrap();
        for i in 0..3 {
            let id = correct_id(&session);
            session.answer(&id);
            session.advance();
            let expected = if i < 2 { 2 } else { 3 };
            assert_eq!(session.target_difficulty().get(), expected);
        }
        assert!(recorder.events().iter().any(|e| matches!(
            e,
            SessionEvent::DifficultyChanged { from, to } if from.get() == 2 && to.get() == 3
        )));
    }

    #[test]
    fn difficulty_drops_after_poor_accuracy() {
        let mut session = session_with(fixed_pool_config(8), calm());
        session.start("All").unwrap();
        for _ in 0..3 {
            let id = wrong_id(&session);
            session.answer(&id);
            session.advance();
        }
        assert_eq!(session.target_difficulty().get(), 1);
        for _ in 0..3 {
            let id = wrong_id(&session);
            session.answer(&id);
            session.advance();
        }
        assert_eq!(session.target_difficulty(), Difficulty::MIN);
    }

    #[test]
    fn high_stress_demotes_despite_accuracy() {
        let stressed = EngagementReading {
            attention: 60.0,
            relaxation: 40.0,
            stress: 90.0,
        };
        let mut session = session_with(fixed_pool_config(6), stressed);
        session.start("All").unwrap();
        for _ in 0..3 {
            let id = correct_id(&session);
            session.answer(&id);
            session.advance();
        }
        assert_eq!(session.target_difficulty().get(), 1);
    }

    #[test]
    fn timeout_resets_streak_and_advances() {
        let recorder = RecordingObserver::new();
        let mut session = session_with(fixed_pool_config(5), calm())
            .with_observer(Box::new(recorder.clone()));
        session.start("All").unwrap();
        let id = correct_id(&session);
        session.answer(&id);
        session.advance();
        assert_eq!(session.streak(), 1);

        let timed_out = session.current_question().unwrap().id.clone();
        let xp = session.xp();
        let mut result = Tick::Idle;
        for _ in 0..30 {
            result = session.tick_clock();
        }
        assert_eq!(result, Tick::Expired(Progress::NextQuestion));
        assert_eq!(session.streak(), 0);
        assert_eq!(session.xp(), xp);
        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.time_left(), 30);
        assert_ne!(session.current_question().unwrap().id, timed_out);
        assert_eq!(
            session.history().last().map(|r| r.outcome),
            Some(AnswerOutcome::TimedOut)
        );
        assert!(recorder.events().contains(&SessionEvent::TimedOut {
            question_id: timed_out
        }));
    }

    #[test]
    fn clock_frozen_after_answer() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        session.tick_clock();
        let id = correct_id(&session);
        session.answer(&id);
        for _ in 0..40 {
            assert_eq!(session.tick_clock(), Tick::Idle);
        }
        assert_eq!(session.time_left(), 29);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn ticks_have_no_effect_outside_progress() {
        let mut session = Session::seeded(bank(), SessionConfig::default(), 5);
        assert_eq!(session.tick_clock(), Tick::Idle);
        assert!(session.tick_engagement().is_none());
        assert_eq!(session.reading(), EngagementReading::BASELINE);

        session.start("All").unwrap();
        assert!(session.tick_engagement().is_some());
        session.end();
        let frozen = session.reading();
        assert!(session.tick_engagement().is_none());
        assert_eq!(session.tick_clock(), Tick::Idle);
        assert_eq!(session.reading(), frozen);
    }

    #[test]
    fn hint_debits_once_per_question_by_default() {
        let mut session = session_with(fixed_pool_config(13), calm());
        session.start("All").unwrap();
        // Earn some XP, then find a question with a hint.
        while session.xp() < 20 {
            let id = correct_id(&session);
            session.answer(&id);
            session.advance();
        }
        while session.current_question().unwrap().hint_text().is_none() {
            session.advance();
        }
        let xp = session.xp();
        assert!(session.use_hint().is_some());
        assert_eq!(session.xp(), xp - 5);
        assert!(session.use_hint().is_some());
        assert_eq!(session.xp(), xp - 5);
    }

    #[test]
    fn repeatable_hints_debit_every_time_and_floor_at_zero() {
        let config = SessionConfig {
            hint_policy: HintPolicy::Repeatable,
            ..fixed_pool_config(13)
        };
        let mut session = session_with(config, calm());
        session.start("All").unwrap();
        let id = correct_id(&session);
        session.answer(&id);
        session.advance();
        while session.current_question().unwrap().hint_text().is_none() {
            session.advance();
        }
        let xp = session.xp();
        assert!(xp > 0);
        for _ in 0..20 {
            assert!(session.use_hint().is_some());
        }
        assert_eq!(session.xp(), 0);
    }

    #[test]
    fn hint_unavailable_leaves_xp_unchanged() {
        let recorder = RecordingObserver::new();
        let mut session = session_with(fixed_pool_config(13), calm())
            .with_observer(Box::new(recorder.clone()));
        session.start("All").unwrap();
        let id = correct_id(&session);
        session.answer(&id);
        session.advance();
        while session.current_question().unwrap().hint_text().is_some() {
            session.advance();
        }
        let xp = session.xp();
        assert!(session.use_hint().is_none());
        assert_eq!(session.xp(), xp);
        assert!(recorder
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::HintUnavailable { .. })));
    }

    #[test]
    fn hint_disabled_after_answering() {
        let mut session = session_with(fixed_pool_config(13), calm());
        session.start("All").unwrap();
        while session.current_question().unwrap().hint_text().is_none() {
            session.advance();
        }
        let id = wrong_id(&session);
        session.answer(&id);
        assert!(session.use_hint().is_none());
    }

    #[test]
    fn finished_summary_reports_aggregates() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        while session.status() == SessionStatus::InProgress {
            let id = correct_id(&session);
            session.answer(&id);
            session.advance();
        }
        let summary = session.summary().unwrap();
        assert_eq!(summary.answered, 5);
        assert_eq!(summary.correct, 5);
        assert_eq!(summary.xp, session.xp());
        assert_eq!(summary.category, "All");
        assert_eq!(summary.accuracy_percent, 100);
        assert_eq!(summary.history.len(), 5);
        assert!(summary.has_streak_badge());
    }

    #[test]
    fn end_finishes_early() {
        let mut session = session_with(fixed_pool_config(8), calm());
        session.start("All").unwrap();
        let id = correct_id(&session);
        session.answer(&id);
        assert_eq!(session.end(), Progress::Finished);
        assert_eq!(session.status(), SessionStatus::Finished);
        assert_eq!(session.summary().unwrap().answered, 1);
        assert_eq!(session.end(), Progress::Ignored);

        let (xp, answered, correct) = (
            session.xp(),
            session.answered_count(),
            session.correct_count(),
        );
        assert!(session.answer(&id).is_none());
        assert!(session.answer("b").is_none());
        assert!(session.use_hint().is_none());
        assert_eq!(session.xp(), xp);
        assert_eq!(session.answered_count(), answered);
        assert_eq!(session.correct_count(), correct);
        assert_eq!(session.summary().unwrap().answered, 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = session_with(fixed_pool_config(6), calm());
        session.start("All").unwrap();
        for _ in 0..3 {
            let id = correct_id(&session);
            session.answer(&id);
            session.advance();
        }
        assert_eq!(session.target_difficulty().get(), 3);
        session.reset();
        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.xp(), 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.total_questions(), 0);
        assert_eq!(session.target_difficulty().get(), 2);
        assert_eq!(session.reading(), calm());
        assert!(session.summary().is_none());
        assert!(session.answer("a").is_none());
        assert_eq!(session.advance(), Progress::Ignored);
    }

    #[test]
    fn restart_after_finish() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session.start("All").unwrap();
        session.end();
        session.start("Programming").unwrap();
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert!(session
            .pool()
            .iter()
            .all(|q| q.category == "Programming"));
    }

    #[test]
    fn multi_category_filter() {
        let mut session = session_with(fixed_pool_config(5), calm());
        session
            .start_with(CategoryFilter::AnyOf(vec!["Art".into(), "Geography".into()]))
            .unwrap();
        assert_eq!(session.total_questions(), 4);
        assert!(session
            .pool()
            .iter()
            .all(|q| q.category == "Art" || q.category == "Geography"));
    }

    #[test]
    fn same_seed_same_session() {
        let run = |seed| {
            let mut session = Session::seeded(bank(), SessionConfig::default(), seed);
            session.start("All").unwrap();
            let mut ids = Vec::new();
            while let Some(q) = session.current_question() {
                ids.push(q.id.clone());
                session.tick_engagement();
                session.advance();
            }
            ids
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn invariants_hold_under_mixed_play() {
        for seed in 0..30 {
            let mut session = Session::seeded(bank(), SessionConfig::default(), seed);
            session.start("All").unwrap();
            let mut step = 0u64;
            while session.status() == SessionStatus::InProgress {
                step += 1;
                match step % 5 {
                    0 => {
                        for _ in 0..30 {
                            session.tick_clock();
                        }
                    }
                    1 => {
                        session.use_hint();
                        let id = wrong_id(&session);
                        session.answer(&id);
                        session.advance();
                    }
                    _ => {
                        session.tick_engagement();
                        let id = correct_id(&session);
                        session.answer(&id);
                        session.advance();
                    }
                }
                assert_counters(&session);
            }
            assert_eq!(
                session.answered_count() as usize,
                session.total_questions()
            );
        }
    }
}
