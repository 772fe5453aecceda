//! The `adaptquiz init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("adaptquiz.toml").exists() {
        println!("adaptquiz.toml already exists, skipping.");
    } else {
        std::fs::write("adaptquiz.toml", SAMPLE_CONFIG)?;
        println!("Created adaptquiz.toml");
    }

    std::fs::create_dir_all("banks")?;
    let bank_path = Path::new("banks/general.toml");
    if bank_path.exists() {
        println!("banks/general.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, GENERAL_BANK)?;
        println!("Created banks/general.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: adaptquiz validate --bank banks");
    println!("  2. Run: adaptquiz categories --bank banks");
    println!("  3. Run: adaptquiz play --bank banks --category All");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptquiz configuration

timer_budget_secs = 30
clock_tick_ms = 1000
engagement_tick_ms = 3000
recalibration_period = 3
pool_size = { min = 5, max = 10 }
hint_cost = 5
baseline_difficulty = 2
entry_max_difficulty = 2

# "on_reach" pays at streaks 3, 6, 9...; "on_prior" one answer later.
streak_bonus = "on_reach"
# "once_per_question" or "repeatable"
hint_policy = "once_per_question"
allow_short_pool = true
"#;

const GENERAL_BANK: &str = include_str!("../../../../banks/general.toml");
