//! The `adaptquiz categories` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use adaptquiz_core::model::CategoryFilter;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = super::load_bank(&bank_path)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Questions", "Difficulty"]);
    for (category, count) in bank.count_by_category() {
        let levels: Vec<u8> = bank
            .filter(&CategoryFilter::One(category.clone()))
            .iter()
            .map(|q| q.difficulty.get())
            .collect();
        let min = levels.iter().min().copied().unwrap_or_default();
        let max = levels.iter().max().copied().unwrap_or_default();
        let range = if min == max {
            min.to_string()
        } else {
            format!("{min}-{max}")
        };
        table.add_row(vec![Cell::new(category), Cell::new(count), Cell::new(range)]);
    }
    println!("{table}");
    println!("{} questions in {} categories", bank.len(), bank.categories().len());

    Ok(())
}
