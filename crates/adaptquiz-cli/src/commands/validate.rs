//! The `adaptquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptquiz_core::parser;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let sets = parser::load_banks(&bank_path)?;
    anyhow::ensure!(!sets.is_empty(), "no bank files found in {}", bank_path.display());

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for set in &sets {
        println!("Bank: {} ({} questions)", set.name, set.questions.len());

        for w in parser::validate_questions(&set.questions) {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            let level = if w.is_error { "ERROR" } else { "WARNING" };
            println!("{prefix} {level}: {}", w.message);
            if w.is_error {
                total_errors += 1;
            } else {
                total_warnings += 1;
            }
        }
    }

    if total_errors == 0 && total_warnings == 0 {
        println!("All banks valid.");
    } else if total_errors == 0 {
        println!("\n{total_warnings} warning(s) found.");
    } else {
        anyhow::bail!("{total_errors} error(s), {total_warnings} warning(s) found");
    }

    Ok(())
}
