//! Per-answer records and the aggregates derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

/// How a question was left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The countdown expired before an answer.
    TimedOut,
    /// The learner moved on without answering.
    Skipped,
}

impl AnswerOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerOutcome::Correct)
    }
}

/// One question's result within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Chosen option, if the question was answered.
    #[serde(default)]
    pub option_id: Option<String>,
    pub outcome: AnswerOutcome,
    /// XP credited by this answer, streak bonus included.
    pub xp_delta: u32,
    /// Seconds left on the clock when the question was left.
    pub time_left: u32,
    /// Hints requested for this question.
    #[serde(default)]
    pub hints_used: u32,
}

/// Answered/correct counts for one slice of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownStats {
    pub answered: u32,
    pub correct: u32,
}

impl BreakdownStats {
    /// Fraction correct; 0.0 with nothing answered.
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.correct as f64 / self.answered as f64
        }
    }

    fn record(&mut self, outcome: AnswerOutcome) {
        self.answered += 1;
        if outcome.is_correct() {
            self.correct += 1;
        }
    }
}

pub fn by_category(records: &[AnswerRecord]) -> BTreeMap<String, BreakdownStats> {
    let mut stats: BTreeMap<String, BreakdownStats> = BTreeMap::new();
    for r in records {
        stats.entry(r.category.clone()).or_default().record(r.outcome);
    }
    stats
}

/// Keyed by difficulty level 1..=5.
pub fn by_difficulty(records: &[AnswerRecord]) -> BTreeMap<u8, BreakdownStats> {
    let mut stats: BTreeMap<u8, BreakdownStats> = BTreeMap::new();
    for r in records {
        stats.entry(r.difficulty.get()).or_default().record(r.outcome);
    }
    stats
}

/// Rounded percentage of correct answers; 0 with nothing answered.
pub fn accuracy_percent(correct: u32, answered: u32) -> u32 {
    if answered == 0 {
        return 0;
    }
    (correct as f64 * 100.0 / answered as f64).round() as u32
}

/// Categories ordered weakest first, at most `limit` of them.
///
/// Ties break toward the category with more answers, then by name.
pub fn recommended_topics(per_category: &BTreeMap<String, BreakdownStats>, limit: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, &BreakdownStats)> = per_category
        .iter()
        .filter(|(_, s)| s.answered > 0 && s.correct < s.answered)
        .collect();
    ranked.sort_by(|(an, a), (bn, b)| {
        a.accuracy()
            .total_cmp(&b.accuracy())
            .then(b.answered.cmp(&a.answered))
            .then(an.cmp(bn))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Coarse grading of a session's accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Great,
    Good,
    KeepPracticing,
}

impl ScoreBand {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            90.. => ScoreBand::Excellent,
            70..=89 => ScoreBand::Great,
            50..=69 => ScoreBand::Good,
            _ => ScoreBand::KeepPracticing,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent!",
            ScoreBand::Great => "Great job!",
            ScoreBand::Good => "Good effort!",
            ScoreBand::KeepPracticing => "Keep practicing!",
        }
    }

    pub fn feedback(self) -> &'static str {
        match self {
            ScoreBand::Excellent => {
                "You've mastered this topic! Try a more challenging category next."
            }
            ScoreBand::Great => {
                "That's a solid performance! A bit more practice and you'll be an expert."
            }
            ScoreBand::Good => {
                "You're making good progress. Review the explanations to improve further."
            }
            ScoreBand::KeepPracticing => {
                "Don't worry! Learning takes time. Review the material and try again."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Efficiency {
    High,
    Medium,
    Developing,
}

impl Efficiency {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            80.. => Efficiency::High,
            60..=79 => Efficiency::Medium,
            _ => Efficiency::Developing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Efficiency::High => "High",
            Efficiency::Medium => "Medium",
            Efficiency::Developing => "Developing",
        }
    }
}
