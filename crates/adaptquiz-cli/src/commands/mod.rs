pub mod categories;
pub mod init;
pub mod play;
pub mod simulate;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use adaptquiz_core::parser;
use adaptquiz_core::report::SessionSummary;
use adaptquiz_core::QuestionBank;

/// Load every bank under `path` into one validated bank.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    let sets = parser::load_banks(path)?;
    let bank = QuestionBank::from_sets(sets)
        .with_context(|| format!("invalid question bank: {}", path.display()))?;
    anyhow::ensure!(!bank.is_empty(), "no questions found in {}", path.display());
    tracing::debug!(questions = bank.len(), path = %path.display(), "bank loaded");
    Ok(bank)
}

pub fn print_summary(summary: &SessionSummary) {
    println!("\nSession summary: {}", summary.message());

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Category", summary.category.clone()),
        (
            "Answered",
            format!("{} of {}", summary.answered, summary.total_questions),
        ),
        ("Correct", summary.correct.to_string()),
        ("Accuracy", format!("{}%", summary.accuracy_percent)),
        ("XP", summary.xp.to_string()),
        ("Best streak", summary.best_streak.to_string()),
        (
            "Final difficulty",
            format!(
                "{} ({})",
                summary.final_difficulty.label(),
                summary.final_difficulty
            ),
        ),
        ("Hints used", summary.hints_used.to_string()),
        ("Timeouts", summary.timeouts().to_string()),
        ("Learning efficiency", summary.efficiency.label().to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }
    println!("{table}");

    if !summary.per_category.is_empty() {
        let mut categories = Table::new();
        categories.set_header(vec!["Category", "Correct", "Answered", "Accuracy"]);
        for (name, stats) in &summary.per_category {
            categories.add_row(vec![
                Cell::new(name),
                Cell::new(stats.correct),
                Cell::new(stats.answered),
                Cell::new(format!("{:.0}%", stats.accuracy() * 100.0)),
            ]);
        }
        println!("{categories}");
    }

    println!("{}", summary.feedback());
    if summary.has_streak_badge() {
        println!("Streak badge earned: {} in a row!", summary.streak);
    }
    let topics = summary.recommended_topics(3);
    if !topics.is_empty() {
        println!("Recommended topics: {}", topics.join(", "));
    }
}
