//! The `adaptquiz simulate` command.
//!
//! Plays a session with a scripted learner on the synchronous API. One
//! clock tick stands for one second of thinking; engagement refreshes at
//! the configured ratio of the two periods.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use adaptquiz_core::config::load_config_from;
use adaptquiz_core::{Session, SessionStatus, Tick};

/// Chance the learner lets the clock run out.
const TIMEOUT_RATE: f64 = 0.1;
/// Chance the learner asks for an available hint.
const HINT_RATE: f64 = 0.3;
/// Seconds the learner spends on a question it answers.
const THINK_SECS: std::ops::RangeInclusive<u32> = 2..=20;

pub fn execute(
    bank_path: PathBuf,
    category: String,
    seed: u64,
    accuracy: f64,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&accuracy),
        "accuracy must be between 0.0 and 1.0"
    );

    let config = load_config_from(config_path.as_deref())?;
    let engagement_every = (config.engagement_tick_ms / config.clock_tick_ms).max(1);
    let bank = super::load_bank(&bank_path)?;

    let mut session = Session::seeded(bank, config, seed);
    session.start(&category)?;
    println!(
        "Simulating {} question(s) from {} (seed {seed}, accuracy {:.0}%)",
        session.total_questions(),
        category,
        accuracy * 100.0
    );

    let mut learner = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut ticks: u64 = 0;

    while session.status() == SessionStatus::InProgress {
        let Some(question) = session.current_question() else {
            break;
        };
        let number = session.question_number();
        let label = format!("Q{number} [{}] {}", question.difficulty, question.category);
        let correct_id = question.correct_option().map(|o| o.id.clone());
        let wrong_id = question
            .options
            .iter()
            .find(|o| !o.is_correct)
            .map(|o| o.id.clone());
        let wants_hint = question.hint_text().is_some() && learner.gen_bool(HINT_RATE);
        let lets_time_out = learner.gen_bool(TIMEOUT_RATE);
        let knows = learner.gen_bool(accuracy);
        let think = learner.gen_range(THINK_SECS);

        if wants_hint && session.use_hint().is_some() {
            println!("{label}: used a hint");
        }

        let mut expired = false;
        let mut waited = 0;
        while lets_time_out || waited < think {
            ticks += 1;
            waited += 1;
            if ticks % engagement_every == 0 {
                session.tick_engagement();
            }
            if let Tick::Expired(_) = session.tick_clock() {
                expired = true;
                break;
            }
        }
        if expired {
            println!("{label}: timed out");
            continue;
        }

        let choice = if knows {
            correct_id
        } else {
            wrong_id.or(correct_id)
        };
        if let Some(score) = choice.and_then(|id| session.answer(&id)) {
            let verdict = if score.correct { "correct" } else { "incorrect" };
            println!(
                "{label}: {verdict} (+{} XP, streak {})",
                score.total_xp(),
                score.streak
            );
        }
        session.advance();
    }

    let summary = session
        .summary()
        .cloned()
        .context("session ended without a summary")?;
    super::print_summary(&summary);

    let filename = format!(
        "summary-{}.json",
        summary.finished_at.format("%Y%m%d-%H%M%S")
    );
    let path = output.join(filename);
    summary.save_json(&path)?;
    println!("\nSummary saved to {}", path.display());

    Ok(())
}
