//! The `adaptiq reset` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptiq_core::traits::StateStore;

use super::Workspace;

pub fn execute(learner: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let ws = Workspace::load(config_path, learner)?;
    let store = ws.store();

    let path = store.path_for(&ws.learner);
    store.reset(&ws.learner);

    println!(
        "Reset adaptive state and quiz progress for '{}' ({}).",
        ws.learner,
        path.display()
    );
    Ok(())
}
