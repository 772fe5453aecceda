//! Next-question selection biased toward the target difficulty.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Difficulty, Question};

/// Maximum level distance for a question to count as adjacent.
pub const ADJACENT_DISTANCE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// An unasked question within one level of the target.
    Adjacent(&'a Question),
    /// No adjacent question was left; any unasked question.
    Fallback(&'a Question),
    /// Every pool question has been asked.
    Exhausted,
}

impl<'a> Selection<'a> {
    pub fn question(&self) -> Option<&'a Question> {
        match self {
            Selection::Adjacent(q) | Selection::Fallback(q) => Some(q),
            Selection::Exhausted => None,
        }
    }
}

/// Pick the next question uniformly among unasked adjacent ones, falling
/// back to any unasked one.
pub fn pick_next<'a, R: Rng + ?Sized>(
    pool: &'a [Question],
    asked: &HashSet<String>,
    target: Difficulty,
    rng: &mut R,
) -> Selection<'a> {
    let unasked: Vec<&Question> = pool.iter().filter(|q| !asked.contains(&q.id)).collect();

    let adjacent: Vec<&Question> = unasked
        .iter()
        .copied()
        .filter(|q| q.difficulty.distance(target) <= ADJACENT_DISTANCE)
        .collect();

    if let Some(&q) = adjacent.choose(rng) {
        return Selection::Adjacent(q);
    }
    match unasked.choose(rng) {
        Some(&q) => Selection::Fallback(q),
        None => Selection::Exhausted,
    }
}
