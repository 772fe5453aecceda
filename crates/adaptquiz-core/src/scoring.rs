//! XP scoring for answers, streak bonuses and hint debits.
//!
//! A correct answer earns `10 + difficulty * 5 + floor(time_left / 5)` XP.
//! Every third consecutive correct answer pays a streak bonus of
//! `streak * 5`. Incorrect answers reset the streak and earn nothing.

use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

pub const BASE_XP: u32 = 10;
pub const DIFFICULTY_XP: u32 = 5;
pub const TIME_BONUS_DIVISOR: u32 = 5;
pub const STREAK_BONUS_XP: u32 = 5;
pub const STREAK_BONUS_EVERY: u32 = 3;

/// Which streak value the bonus is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakBonusRule {
    /// The streak after this answer: reaching 3, 6, 9... pays.
    #[default]
    OnReach,
    /// The streak before this answer: the answer after reaching 3, 6, 9... pays.
    OnPrior,
}

/// Whether repeated hint requests for one question are charged again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintPolicy {
    /// Charge the first request per question; repeats show the hint for free.
    #[default]
    OncePerQuestion,
    /// Charge every request.
    Repeatable,
}

/// The effect of one answer on XP and streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub correct: bool,
    /// Base + difficulty + time XP.
    pub xp_gain: u32,
    /// Extra XP from the streak bonus, 0 when none was paid.
    pub streak_bonus: u32,
    /// Streak after this answer.
    pub streak: u32,
}

impl AnswerScore {
    pub fn total_xp(&self) -> u32 {
        self.xp_gain + self.streak_bonus
    }
}

/// XP for a correct answer before any streak bonus.
pub fn xp_for_correct(difficulty: Difficulty, time_left: u32) -> u32 {
    BASE_XP + difficulty.get() as u32 * DIFFICULTY_XP + time_left / TIME_BONUS_DIVISOR
}

/// Streak bonus for a correct answer given the streak before and after it.
pub fn streak_bonus(rule: StreakBonusRule, prior: u32, reached: u32) -> u32 {
    let basis = match rule {
        StreakBonusRule::OnReach => reached,
        StreakBonusRule::OnPrior => prior,
    };
    if basis > 0 && basis % STREAK_BONUS_EVERY == 0 {
        basis * STREAK_BONUS_XP
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    rule: StreakBonusRule,
    hint_cost: u32,
}

impl ScoringEngine {
    pub fn new(rule: StreakBonusRule, hint_cost: u32) -> Self {
        Self { rule, hint_cost }
    }

    pub fn hint_cost(&self) -> u32 {
        self.hint_cost
    }

    /// Score an answer given the streak before it.
    pub fn score(
        &self,
        correct: bool,
        difficulty: Difficulty,
        time_left: u32,
        prior_streak: u32,
    ) -> AnswerScore {
        if !correct {
            return AnswerScore {
                correct,
                xp_gain: 0,
                streak_bonus: 0,
                streak: 0,
            };
        }
        let streak = prior_streak + 1;
        AnswerScore {
            correct,
            xp_gain: xp_for_correct(difficulty, time_left),
            streak_bonus: streak_bonus(self.rule, prior_streak, streak),
            streak,
        }
    }

    /// XP remaining after a hint debit; never below zero.
    pub fn after_hint(&self, xp: u32) -> u32 {
        xp.saturating_sub(self.hint_cost)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(StreakBonusRule::default(), 5)
    }
}
