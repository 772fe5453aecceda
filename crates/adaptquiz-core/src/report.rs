//! Final session summary with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Difficulty;
use crate::statistics::{
    self, AnswerOutcome, AnswerRecord, BreakdownStats, Efficiency, ScoreBand,
};

/// Aggregates reported once a session finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique session identifier.
    pub id: Uuid,
    /// Category label the pool was drawn from.
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub answered: u32,
    pub correct: u32,
    /// Size of the sampled pool.
    pub total_questions: usize,
    pub xp: u32,
    /// Streak at the moment the session finished.
    pub streak: u32,
    /// Longest streak reached during the session.
    pub best_streak: u32,
    /// Target difficulty when the session finished.
    pub final_difficulty: Difficulty,
    pub hints_used: u32,
    pub accuracy_percent: u32,
    pub score_band: ScoreBand,
    pub efficiency: Efficiency,
    pub per_category: BTreeMap<String, BreakdownStats>,
    pub per_difficulty: BTreeMap<u8, BreakdownStats>,
    /// Every question left behind, in order.
    pub history: Vec<AnswerRecord>,
}

/// Raw session figures a summary is computed from.
pub struct SummaryInput {
    pub id: Uuid,
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub answered: u32,
    pub correct: u32,
    pub total_questions: usize,
    pub xp: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub final_difficulty: Difficulty,
    pub hints_used: u32,
    pub history: Vec<AnswerRecord>,
}

impl SessionSummary {
    pub fn new(input: SummaryInput) -> Self {
        let accuracy_percent = statistics::accuracy_percent(input.correct, input.answered);
        Self {
            id: input.id,
            category: input.category,
            started_at: input.started_at,
            finished_at: Utc::now(),
            answered: input.answered,
            correct: input.correct,
            total_questions: input.total_questions,
            xp: input.xp,
            streak: input.streak,
            best_streak: input.best_streak,
            final_difficulty: input.final_difficulty,
            hints_used: input.hints_used,
            accuracy_percent,
            score_band: ScoreBand::from_percent(accuracy_percent),
            efficiency: Efficiency::from_percent(accuracy_percent),
            per_category: statistics::by_category(&input.history),
            per_difficulty: statistics::by_difficulty(&input.history),
            history: input.history,
        }
    }

    pub fn message(&self) -> &'static str {
        self.score_band.message()
    }

    pub fn feedback(&self) -> &'static str {
        self.score_band.feedback()
    }

    /// A final streak of three or more earns a badge.
    pub fn has_streak_badge(&self) -> bool {
        self.streak >= 3
    }

    pub fn timeouts(&self) -> usize {
        self.history
            .iter()
            .filter(|r| r.outcome == AnswerOutcome::TimedOut)
            .count()
    }

    /// Weakest categories first.
    pub fn recommended_topics(&self, limit: usize) -> Vec<String> {
        statistics::recommended_topics(&self.per_category, limit)
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }
}
