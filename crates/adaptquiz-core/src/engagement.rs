//! Engagement signal used as an adaptation input.
//!
//! The signal is synthetic: [`EngagementSimulator`] jitters a fixed
//! baseline. Anything implementing [`EngagementSource`] can replace it
//! without touching the difficulty adapter.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Attention, relaxation and stress, each in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementReading {
    pub attention: f64,
    pub relaxation: f64,
    pub stress: f64,
}

impl EngagementReading {
    pub const BASELINE: EngagementReading = EngagementReading {
        attention: 70.0,
        relaxation: 60.0,
        stress: 30.0,
    };

    /// Clamp every field into 0..=100. NaN becomes 0.
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) };
        Self {
            attention: clamp(self.attention),
            relaxation: clamp(self.relaxation),
            stress: clamp(self.stress),
        }
    }

    pub fn attention_factor(&self) -> f64 {
        self.attention / 100.0
    }

    pub fn stress_factor(&self) -> f64 {
        self.stress / 100.0
    }
}

impl Default for EngagementReading {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// A source of engagement readings polled on every engagement tick.
pub trait EngagementSource: Send {
    /// Reading in effect at session start and after reset.
    fn baseline(&self) -> EngagementReading;

    /// Produce the next reading.
    fn next_reading(&mut self) -> EngagementReading;
}

// Per-field floors; every field tops out at 100.
const ATTENTION_FLOOR: f64 = 30.0;
const RELAXATION_FLOOR: f64 = 20.0;
const STRESS_FLOOR: f64 = 10.0;

/// Bounded random jitter around a fixed baseline.
pub struct EngagementSimulator {
    baseline: EngagementReading,
    jitter: f64,
    rng: StdRng,
}

impl EngagementSimulator {
    pub const DEFAULT_JITTER: f64 = 10.0;

    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            baseline: EngagementReading::BASELINE,
            jitter: Self::DEFAULT_JITTER,
            rng,
        }
    }

    pub fn with_baseline(mut self, baseline: EngagementReading) -> Self {
        self.baseline = baseline.clamped();
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.abs();
        self
    }

    fn jittered(&mut self, base: f64, floor: f64) -> f64 {
        let offset = if self.jitter > 0.0 {
            self.rng.gen_range(-self.jitter..self.jitter)
        } else {
            0.0
        };
        (base + offset).clamp(floor, 100.0)
    }
}

impl EngagementSource for EngagementSimulator {
    fn baseline(&self) -> EngagementReading {
        self.baseline
    }

    fn next_reading(&mut self) -> EngagementReading {
        let base = self.baseline;
        EngagementReading {
            attention: self.jittered(base.attention, ATTENTION_FLOOR),
            relaxation: self.jittered(base.relaxation, RELAXATION_FLOOR),
            stress: self.jittered(base.stress, STRESS_FLOOR),
        }
    }
}

/// Always reports the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedEngagement(pub EngagementReading);

impl EngagementSource for FixedEngagement {
    fn baseline(&self) -> EngagementReading {
        self.0
    }

    fn next_reading(&mut self) -> EngagementReading {
        self.0
    }
}
