pub mod init;
pub mod mastery;
pub mod record;
pub mod reset;
pub mod session;
pub mod simulate;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adaptiq_core::engine::AdaptiveEngine;
use adaptiq_core::model::QuestionPool;
use adaptiq_core::progress::QuizProgress;
use adaptiq_core::traits::StateStore;
use adaptiq_store::{AdaptiqConfig, JsonFileStore};

/// Settings shared by the commands that touch learner state.
pub struct Workspace {
    pub config: AdaptiqConfig,
    pub learner: String,
}

impl Workspace {
    pub fn load(config_path: Option<PathBuf>, learner: Option<String>) -> Result<Self> {
        let config = adaptiq_store::load_config_from(config_path.as_deref())?;
        let learner = learner.unwrap_or_else(|| config.default_learner.clone());
        if learner.trim().is_empty() {
            anyhow::bail!("learner id must not be empty");
        }
        Ok(Self { config, learner })
    }

    /// `--pool`, else the configured pool.
    pub fn pool_path(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        arg.or_else(|| self.config.pool.clone()).context(
            "no question pool given; pass --pool or set `pool` in adaptiq.toml",
        )
    }

    pub fn load_pool(&self, arg: Option<PathBuf>) -> Result<QuestionPool> {
        let path = self.pool_path(arg)?;
        load_pool(&path)
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.config.store_dir)
    }

    pub fn engine(&self, pool: QuestionPool) -> AdaptiveEngine {
        let store: Arc<dyn StateStore> = Arc::new(self.store());
        AdaptiveEngine::new(store, Arc::new(pool), self.config.engine_config())
    }
}

pub fn load_pool(path: &Path) -> Result<QuestionPool> {
    let pool = adaptiq_core::parser::parse_pool(path)?;
    if pool.questions.is_empty() {
        anyhow::bail!("pool '{}' has no regular questions", pool.id);
    }
    Ok(pool)
}

/// One-line quiz progress, `None` before the first submitted session.
pub fn progress_line(progress: &QuizProgress) -> Option<String> {
    if progress.total_attempts == 0 {
        return None;
    }
    Some(format!(
        "Best score {}, {} session(s) submitted, last on {}",
        format_best(progress),
        progress.total_attempts,
        format_last(progress)
    ))
}

pub fn format_best(progress: &QuizProgress) -> String {
    progress
        .best_score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_last(progress: &QuizProgress) -> String {
    progress
        .last_attempt
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate `s` to at most `max` characters for table display.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
