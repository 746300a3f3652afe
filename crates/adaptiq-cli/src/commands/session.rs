//! The `adaptiq session` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use adaptiq_core::irt::AbilityLevel;

use super::{truncate, Workspace};

pub fn execute(
    pool_path: Option<PathBuf>,
    learner: Option<String>,
    out: PathBuf,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ws = Workspace::load(config_path, learner)?;
    let pool = ws.load_pool(pool_path)?;

    let mut engine = ws.engine(pool);
    if let Some(seed) = seed {
        engine = engine.with_rng(ChaCha8Rng::seed_from_u64(seed));
    }

    let state = engine.state(&ws.learner);
    let plan = engine.start_session(&ws.learner);

    println!(
        "Session {} for '{}' (θ = {:.2}, {})",
        plan.session_number,
        ws.learner,
        state.student.theta,
        AbilityLevel::from_theta(state.student.theta)
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Kind", "Tag", "Text"]);
    for (position, item) in plan.items.iter().enumerate() {
        let id = plan
            .id_map
            .get(&position)
            .map(|id| id.to_string())
            .unwrap_or_default();
        let tag = plan
            .tag_map
            .get(&position)
            .map(|t| t.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(position + 1),
            Cell::new(id),
            Cell::new(item.kind),
            Cell::new(tag),
            Cell::new(truncate(&item.text, 60)),
        ]);
    }
    println!("{table}");

    plan.save_json(&out)?;
    println!("Plan written to {}", out.display());

    Ok(())
}
