//! The question bank and pool sampling.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PoolSize;
use crate::error::{BankError, SessionError};
use crate::model::{CategoryFilter, Difficulty, Question, QuestionSet};

/// An immutable collection of validated questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

/// Search parameters for browsing a bank.
#[derive(Debug, Clone)]
pub struct QuestionQuery {
    /// Case-insensitive substring matched against text and category.
    pub search: Option<String>,
    pub category: CategoryFilter,
    pub difficulty: Option<Difficulty>,
}

impl Default for QuestionQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: CategoryFilter::All,
            difficulty: None,
        }
    }
}

/// How the pool was sized, for tracing and tests.
#[derive(Debug, Clone)]
pub struct SampledPool {
    /// Sampled questions; the entry question is first.
    pub questions: Vec<Question>,
    /// Count drawn from the pool size range before truncation.
    pub drawn: usize,
}

impl QuestionBank {
    /// Build a bank, rejecting questions that break the data-model invariants.
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        if let Some(problem) = check_questions(&questions).into_iter().next() {
            return Err(problem);
        }
        Ok(Self { questions })
    }

    /// Merge several question sets into one bank.
    pub fn from_sets(sets: impl IntoIterator<Item = QuestionSet>) -> Result<Self, BankError> {
        Self::new(sets.into_iter().flat_map(|s| s.questions).collect())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Sorted, de-duplicated category names.
    pub fn categories(&self) -> Vec<String> {
        self.count_by_category().into_keys().collect()
    }

    pub fn count_by_category(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Questions passing a category filter, in bank order.
    pub fn filter(&self, filter: &CategoryFilter) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| filter.matches(&q.category))
            .collect()
    }

    /// Questions matching search text, category and difficulty.
    pub fn query(&self, query: &QuestionQuery) -> Vec<&Question> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.questions
            .iter()
            .filter(|q| query.category.matches(&q.category))
            .filter(|q| query.difficulty.map_or(true, |d| q.difficulty == d))
            .filter(|q| match &needle {
                Some(n) => {
                    q.text.to_lowercase().contains(n) || q.category.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect()
    }

    /// Sample a session pool.
    ///
    /// Filters by category, shuffles, and keeps a count drawn uniformly from
    /// `size`. The first sampled question at or below `entry_max` is moved
    /// to the front; without one, the first sampled question leads.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        filter: &CategoryFilter,
        size: PoolSize,
        allow_short: bool,
        entry_max: Difficulty,
        rng: &mut R,
    ) -> Result<SampledPool, SessionError> {
        if size.min == 0 || size.min > size.max {
            return Err(SessionError::InvalidPoolSize {
                min: size.min,
                max: size.max,
            });
        }

        let mut candidates = self.filter(filter);
        if candidates.is_empty() || (!allow_short && candidates.len() < size.min) {
            return Err(SessionError::NoQuestionsAvailable {
                category: filter.label(),
            });
        }

        candidates.shuffle(rng);
        let drawn = rng.gen_range(size.min..=size.max);
        candidates.truncate(drawn);

        let mut questions: Vec<Question> = candidates.into_iter().cloned().collect();
        if let Some(entry) = questions.iter().position(|q| q.difficulty <= entry_max) {
            let first = questions.remove(entry);
            questions.insert(0, first);
        }

        Ok(SampledPool { questions, drawn })
    }
}

/// Every invariant violation in a list of questions.
pub fn check_questions(questions: &[Question]) -> Vec<BankError> {
    let mut problems = Vec::new();
    let mut seen_ids = HashSet::new();

    for q in questions {
        if !seen_ids.insert(q.id.as_str()) {
            problems.push(BankError::DuplicateId(q.id.clone()));
        }
        problems.extend(check_question(q));
    }

    problems
}

/// Invariant violations of a single question.
pub fn check_question(q: &Question) -> Vec<BankError> {
    let mut problems = Vec::new();

    if q.text.trim().is_empty() {
        problems.push(BankError::EmptyText(q.id.clone()));
    }

    if q.options.is_empty() {
        problems.push(BankError::NoOptions(q.id.clone()));
        return problems;
    }

    let mut seen_options = HashSet::new();
    for option in &q.options {
        if !seen_options.insert(option.id.as_str()) {
            problems.push(BankError::DuplicateOptionId {
                question_id: q.id.clone(),
                option_id: option.id.clone(),
            });
        }
    }

    match q.options.iter().filter(|o| o.is_correct).count() {
        0 => problems.push(BankError::NoCorrectOption(q.id.clone())),
        1 => {}
        count => problems.push(BankError::MultipleCorrectOptions {
            id: q.id.clone(),
            count,
        }),
    }

    problems
}
