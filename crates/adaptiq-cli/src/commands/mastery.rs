//! The `adaptiq mastery` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use adaptiq_core::state::MIN_SESSIONS_FOR_ADAPTIVE;

use super::{format_best, format_last, progress_line, Workspace};

pub fn execute(
    pool_path: Option<PathBuf>,
    learner: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ws = Workspace::load(config_path, learner)?;
    let pool = ws.load_pool(pool_path)?;
    let engine = ws.engine(pool);
    let progress = engine.progress(&ws.learner);

    let Some(summary) = engine.mastery(&ws.learner) else {
        let done = engine.state(&ws.learner).student.total_sessions;
        println!(
            "Not enough sessions yet for '{}' ({done} of {MIN_SESSIONS_FOR_ADAPTIVE} completed).",
            ws.learner
        );
        if let Some(line) = progress_line(&progress) {
            println!("{line}");
        }
        return Ok(());
    };

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Overall mastery"),
        Cell::new(format!("{}%", summary.overall_mastery)),
    ]);
    table.add_row(vec![
        Cell::new("Coverage"),
        Cell::new(format!("{:.1}%", summary.coverage_rate * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Questions attempted"),
        Cell::new(summary.questions_attempted),
    ]);
    table.add_row(vec![
        Cell::new("Questions mastered"),
        Cell::new(summary.questions_mastered),
    ]);
    table.add_row(vec![
        Cell::new("Ability"),
        Cell::new(format!(
            "{:.2} ({})",
            summary.estimated_ability, summary.ability_label
        )),
    ]);
    table.add_row(vec![
        Cell::new("Sessions"),
        Cell::new(summary.sessions_completed),
    ]);
    table.add_row(vec![Cell::new("Best score"), Cell::new(format_best(&progress))]);
    table.add_row(vec![
        Cell::new("Submissions"),
        Cell::new(progress.total_attempts),
    ]);
    table.add_row(vec![Cell::new("Last attempt"), Cell::new(format_last(&progress))]);

    println!("Mastery for '{}'", ws.learner);
    println!("{table}");

    Ok(())
}
