//! The `adaptiq record` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use adaptiq_core::irt::AbilityLevel;
use adaptiq_core::report::SessionReport;
use adaptiq_core::session::SessionPlan;

use super::Workspace;

pub fn execute(
    pool_path: Option<PathBuf>,
    plan_path: PathBuf,
    answers: String,
    learner: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ws = Workspace::load(config_path, learner)?;
    let pool = ws.load_pool(pool_path)?;
    let mut plan = SessionPlan::load_json(&plan_path)?;
    let answers = parse_answers(&answers)?;

    for id in plan.id_map.values() {
        if pool.get(id).is_none() {
            tracing::warn!(question = %id, pool = %pool.id, "plan refers to a question outside the pool");
        }
    }

    let engine = ws.engine(pool);
    let before = engine.state(&ws.learner);

    if answers.is_empty() {
        println!("No answers given; nothing recorded.");
        return Ok(());
    }

    if plan.session_number != before.last_session_number + 1 {
        tracing::warn!(
            plan_session = plan.session_number,
            next_session = before.last_session_number + 1,
            "plan was drawn for a different session"
        );
    }

    let report = SessionReport::build(&plan, &answers)?;
    let after = engine.submit_session(&ws.learner, &mut plan, &answers)?;
    plan.save_json(&plan_path)?;

    let report = report
        .with_adaptive(after.is_adaptive())
        .with_ability(before.student.theta, after.student.theta);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            println!("{}", report.to_markdown());
            println!(
                "Ability for '{}': {:.2} ({})",
                ws.learner,
                after.student.theta,
                AbilityLevel::from_theta(after.student.theta)
            );
            if let Some(line) = super::progress_line(&engine.progress(&ws.learner)) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Parse "1,0,1" style correctness flags.
fn parse_answers(raw: &str) -> Result<Vec<bool>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, s)| match s.to_lowercase().as_str() {
            "1" | "y" | "yes" | "true" | "c" => Ok(true),
            "0" | "n" | "no" | "false" | "w" => Ok(false),
            other => Err(anyhow::anyhow!("unrecognized answer '{other}'"))
                .with_context(|| format!("answer {} of --answers", i + 1)),
        })
        .collect()
}
