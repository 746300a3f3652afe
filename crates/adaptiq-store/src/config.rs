//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptiq_core::engine::EngineConfig;
use adaptiq_core::selector::SelectionWeights;

/// Environment variable that overrides `store_dir`.
pub const STORE_DIR_ENV: &str = "ADAPTIQ_STORE_DIR";

/// Top-level adaptiq configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiqConfig {
    /// Directory holding one state file per learner.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Questions per session, bonus item included.
    #[serde(default = "default_questions_per_session")]
    pub questions_per_session: usize,
    /// Pool used when a command gets no `--pool`.
    #[serde(default)]
    pub pool: Option<PathBuf>,
    /// Learner used when a command gets no `--learner`.
    #[serde(default = "default_learner")]
    pub default_learner: String,
    /// Selection weight blend.
    #[serde(default)]
    pub selection: SelectionWeights,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./adaptiq-data")
}
fn default_questions_per_session() -> usize {
    9
}
fn default_learner() -> String {
    "guest".to_string()
}

impl Default for AdaptiqConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            questions_per_session: default_questions_per_session(),
            pool: None,
            default_learner: default_learner(),
            selection: SelectionWeights::default(),
        }
    }
}

impl AdaptiqConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            questions_per_session: self.questions_per_session,
            weights: self.selection,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.questions_per_session == 0 {
            anyhow::bail!("questions_per_session must be at least 1");
        }
        let w = &self.selection;
        for (name, value) in [
            ("srs_weight", w.srs_weight),
            ("irt_weight", w.irt_weight),
            ("jitter", w.jitter),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("selection.{name} must be a non-negative number, got {value}");
            }
        }
        Ok(())
    }

    /// Resolve `${VAR}` references and apply a `store_dir` override.
    fn resolve(mut self, store_dir_override: Option<String>) -> Self {
        self.store_dir = PathBuf::from(resolve_env_vars(&self.store_dir.to_string_lossy()));
        self.pool = self
            .pool
            .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));
        self.default_learner = resolve_env_vars(&self.default_learner);

        if let Some(dir) = store_dir_override.filter(|d| !d.is_empty()) {
            self.store_dir = PathBuf::from(dir);
        }
        self
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptiq.toml` in the current directory
/// 2. `~/.config/adaptiq/config.toml`
///
/// `ADAPTIQ_STORE_DIR` overrides `store_dir`.
pub fn load_config() -> Result<AdaptiqConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptiqConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("adaptiq.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => AdaptiqConfig::default(),
    };

    let config = config.resolve(std::env::var(STORE_DIR_ENV).ok());
    config.validate()?;

    tracing::debug!(
        source = ?config_path,
        store_dir = %config.store_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<AdaptiqConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<AdaptiqConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptiq"))
}
