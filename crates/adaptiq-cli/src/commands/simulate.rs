//! The `adaptiq simulate` command.
//!
//! Runs a synthetic learner whose answers follow the Rasch model at a fixed
//! true ability, against an in-memory store, and prints how the estimate
//! converges.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use adaptiq_core::engine::AdaptiveEngine;
use adaptiq_core::irt::{self, AbilityLevel};
use adaptiq_core::traits::StateStore;
use adaptiq_store::MemoryStore;

use super::Workspace;

const LEARNER: &str = "simulated";

pub fn execute(
    pool_path: Option<PathBuf>,
    ability: f64,
    sessions: u32,
    seed: u64,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if !ability.is_finite() {
        anyhow::bail!("--ability must be a finite number");
    }
    if !(irt::THETA_MIN..=irt::THETA_MAX).contains(&ability) {
        tracing::warn!(ability, "true ability is outside the estimable range");
    }

    let ws = Workspace::load(config_path, None)?;
    let pool = Arc::new(ws.load_pool(pool_path)?);

    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let engine = AdaptiveEngine::new(store, Arc::clone(&pool), ws.config.engine_config())
        .with_rng(ChaCha8Rng::seed_from_u64(seed));
    let mut answer_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

    let mut table = Table::new();
    table.set_header(vec!["Session", "Correct", "θ", "Level", "Error"]);

    for _ in 0..sessions {
        let mut plan = engine.start_session(LEARNER);
        let answers: Vec<bool> = plan
            .id_map
            .values()
            .map(|id| {
                let p = irt::probability_correct(ability, pool.initial_difficulty(id));
                answer_rng.gen::<f64>() < p
            })
            .collect();

        let state = engine.submit_session(LEARNER, &mut plan, &answers)?;
        let theta = state.student.theta;
        let correct = answers.iter().filter(|a| **a).count();

        table.add_row(vec![
            Cell::new(state.last_session_number),
            Cell::new(format!("{correct}/{}", answers.len())),
            Cell::new(format!("{theta:.2}")),
            Cell::new(AbilityLevel::from_theta(theta)),
            Cell::new(format!("{:+.2}", theta - ability)),
        ]);
    }

    println!("{table}");

    let final_theta = engine.state(LEARNER).student.theta;
    println!(
        "Final θ = {final_theta:.2} ({}), true ability {ability:.2}",
        AbilityLevel::from_theta(final_theta)
    );
    if let Some(summary) = engine.mastery(LEARNER) {
        println!(
            "Mastery {}% ({} of {} questions attempted)",
            summary.overall_mastery,
            summary.questions_attempted,
            pool.size()
        );
    }

    Ok(())
}
