// `lishe history` and `lishe rate`

use std::path::Path;

use chrono::Local;
use serde::Serialize;

use lishe_io::{HistoryEntry, HistoryLog};

use crate::{print_json, CliError};

#[derive(Serialize)]
struct HistoryRow<'a> {
    goal: String,
    #[serde(flatten)]
    entry: &'a HistoryEntry,
}

/// Goal files are named after the goal with spaces as `_`.
fn goal_label(file_stem: &str) -> String {
    file_stem.replace('_', " ")
}

pub fn cmd_history(dir: &Path, email: &str, goal: Option<&str>, json: bool) -> Result<(), CliError> {
    let log = HistoryLog::new(dir);
    let mut rows = log.entries_for(email).map_err(CliError::from_history)?;
    if let Some(goal) = goal {
        let stem = goal.trim().replace(' ', "_");
        rows.retain(|(file, _)| *file == stem);
    }

    if json {
        let rows: Vec<HistoryRow> = rows
            .iter()
            .map(|(file, entry)| HistoryRow {
                goal: goal_label(file),
                entry,
            })
            .collect();
        return print_json(&rows);
    }

    if rows.is_empty() {
        eprintln!("no history for {} in {}", email, dir.display());
        return Ok(());
    }
    for (file, entry) in &rows {
        let date = entry
            .recorded_at()
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| entry.date.clone());
        let rating = entry
            .rating
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<16}  {:<24} {:<36} {}", date, goal_label(file), entry.food, rating);
    }
    Ok(())
}

pub fn cmd_rate(
    dir: &Path,
    goal: &str,
    email: &str,
    rating: u8,
    delay_days: u32,
) -> Result<(), CliError> {
    let rated = HistoryLog::new(dir)
        .rate(goal.trim(), email, rating, delay_days, Local::now().naive_local())
        .map_err(CliError::from_history)?;

    if rated == 0 {
        eprintln!(
            "nothing to rate: no unrated '{}' recommendations for {} older than {} day(s)",
            goal, email, delay_days
        );
    } else {
        println!("rated {} recommendation(s) for '{}' with {}", rated, goal, rating);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_label_restores_spaces() {
        assert_eq!(goal_label("Kupunguza_Uzito"), "Kupunguza Uzito");
    }
}
