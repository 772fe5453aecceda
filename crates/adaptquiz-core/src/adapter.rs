//! Difficulty recalibration from accuracy and engagement.

use crate::engagement::EngagementReading;
use crate::model::Difficulty;

/// Accuracy above which the level may rise.
pub const PROMOTE_ACCURACY: f64 = 0.8;
/// Attention factor above which the level may rise.
pub const PROMOTE_ATTENTION: f64 = 0.7;
/// Accuracy below which the level drops.
pub const DEMOTE_ACCURACY: f64 = 0.5;
/// Stress factor above which the level drops.
pub const DEMOTE_STRESS: f64 = 0.8;

/// Outcome of a recalibration check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recalibration {
    pub from: Difficulty,
    pub to: Difficulty,
    pub performance_ratio: f64,
}

impl Recalibration {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Recalibrates the target difficulty every `period` answered questions.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyAdapter {
    period: u32,
}

impl DifficultyAdapter {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// True after the 1st, 2nd, ... full period of answered questions.
    pub fn is_due(&self, answered: u32) -> bool {
        answered > 0 && answered % self.period == 0
    }

    /// Run the check if due; `None` when this answer count does not trigger one.
    pub fn check(
        &self,
        current: Difficulty,
        correct: u32,
        answered: u32,
        reading: &EngagementReading,
    ) -> Option<Recalibration> {
        if !self.is_due(answered) {
            return None;
        }
        let performance_ratio = correct as f64 / answered as f64;
        Some(Recalibration {
            from: current,
            to: recalibrate(current, performance_ratio, reading),
            performance_ratio,
        })
    }
}

/// Step the level up, down, or keep it.
///
/// Promotion needs both high accuracy and high attention; either low
/// accuracy or high stress demotes. Promotion is checked first.
pub fn recalibrate(
    current: Difficulty,
    performance_ratio: f64,
    reading: &EngagementReading,
) -> Difficulty {
    if performance_ratio > PROMOTE_ACCURACY && reading.attention_factor() > PROMOTE_ATTENTION {
        current.harder()
    } else if performance_ratio < DEMOTE_ACCURACY || reading.stress_factor() > DEMOTE_STRESS {
        current.easier()
    } else {
        current
    }
}
