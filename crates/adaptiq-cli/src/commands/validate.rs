//! The `adaptiq validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(pool_path: PathBuf, session_size: usize) -> Result<()> {
    let pools = if pool_path.is_dir() {
        adaptiq_core::parser::load_pool_directory(&pool_path)?
    } else {
        vec![adaptiq_core::parser::parse_pool(&pool_path)?]
    };

    let mut total_warnings = 0;

    for pool in &pools {
        println!(
            "Pool: {} ({} questions, {} bonus)",
            pool.name,
            pool.questions.len(),
            pool.bonus.len()
        );

        let warnings = adaptiq_core::parser::validate_pool(pool, session_size);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if pools.is_empty() {
        println!("No pools found.");
    } else if total_warnings == 0 {
        println!("All pools valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
