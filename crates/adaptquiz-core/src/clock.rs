//! Per-question countdown.
//!
//! The clock does not schedule anything itself; the session calls
//! [`SessionClock::tick`] once per tick period while a question is open.

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Seconds still left on the current question.
    Running(u32),
    /// The budget ran out on this tick (or had already run out).
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    budget: u32,
    time_left: u32,
}

impl SessionClock {
    pub fn new(budget_secs: u32) -> Self {
        Self {
            budget: budget_secs,
            time_left: budget_secs,
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Refill to the full budget for a new question.
    pub fn reset(&mut self) {
        self.time_left = self.budget;
    }

    /// Count down one second.
    pub fn tick(&mut self) -> ClockTick {
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            ClockTick::Expired
        } else {
            ClockTick::Running(self.time_left)
        }
    }
}
