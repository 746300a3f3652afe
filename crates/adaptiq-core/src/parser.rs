//! TOML question pool parser.
//!
//! Loads question pools from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{QuestionItem, QuestionKind, QuestionPool};

/// Intermediate TOML structure for parsing pool files.
#[derive(Debug, Deserialize)]
struct TomlPoolFile {
    pool: TomlPoolHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    bonus: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlPoolHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    kind: String,
    text: String,
    #[serde(default)]
    needs_calculator: bool,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl TomlQuestion {
    fn into_item(self, section: &str, index: usize) -> Result<QuestionItem> {
        let kind: QuestionKind = self
            .kind
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{section}[{index}]: {e}"))?;

        Ok(QuestionItem {
            kind,
            text: self.text,
            needs_calculator: self.needs_calculator,
            explanation: self.explanation,
            payload: self.payload.unwrap_or(serde_json::Value::Null),
        })
    }
}

/// Parse a single TOML file into a `QuestionPool`.
pub fn parse_pool(path: &Path) -> Result<QuestionPool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pool file: {}", path.display()))?;

    parse_pool_str(&content, path)
}

/// Parse a TOML string into a `QuestionPool`.
pub fn parse_pool_str(content: &str, source_path: &Path) -> Result<QuestionPool> {
    let parsed: TomlPoolFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| q.into_item("questions", i))
        .collect::<Result<Vec<_>>>()?;

    let bonus = parsed
        .bonus
        .into_iter()
        .enumerate()
        .map(|(i, q)| q.into_item("bonus", i))
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionPool {
        id: parsed.pool.id,
        name: parsed.pool.name,
        description: parsed.pool.description,
        questions,
        bonus,
    })
}

/// Recursively load all `.toml` pool files from a directory.
pub fn load_pool_directory(dir: &Path) -> Result<Vec<QuestionPool>> {
    let mut pools = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            pools.extend(load_pool_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_pool(&path) {
                Ok(pool) => pools.push(pool),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(pools)
}

/// A warning from pool validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a pool for issues that would degrade sessions.
///
/// `session_size` is the number of questions a session will ask for,
/// bonus included.
pub fn validate_pool(pool: &QuestionPool, session_size: usize) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if pool.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "pool has no regular questions".into(),
        });
    }

    if pool.bonus.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "pool has no bonus questions; sessions will not include a bonus item".into(),
        });
    }

    let regular_needed = if pool.bonus.is_empty() {
        session_size
    } else {
        session_size.saturating_sub(1)
    };
    if !pool.questions.is_empty() && pool.questions.len() < regular_needed {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "only {} regular questions for sessions of {}; sessions will be short",
                pool.questions.len(),
                regular_needed
            ),
        });
    }

    let all = pool
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| (pool.regular_id(i), q))
        .chain(pool.bonus.iter().enumerate().map(|(i, q)| (pool.bonus_id(i), q)));
    for (id, q) in all {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(id.to_string()),
                message: "question text is empty".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[pool]
id = "algebra-basics"
name = "Algebra basics"
description = "Linear equations and inequalities"

[[questions]]
kind = "true-false"
text = "x = 2 solves 3x - 1 = 5"
explanation = "3*2 - 1 = 5"

[questions.payload]
answer = true

[[questions]]
kind = "fill-blank"
text = "Solve for x: 2x + 4 = 10"
needs_calculator = true

[questions.payload]
blanks = ["3"]

[[questions]]
kind = "mc"
text = "Which is a linear equation?"

[[bonus]]
kind = "arrangement"
text = "Order the steps to isolate x"
"#;

    #[test]
    fn parse_valid_toml() {
        let pool = parse_pool_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(pool.id, "algebra-basics");
        assert_eq!(pool.questions.len(), 3);
        assert_eq!(pool.bonus.len(), 1);
        assert_eq!(pool.questions[0].kind, QuestionKind::TrueFalse);
        assert_eq!(pool.questions[0].payload["answer"], serde_json::json!(true));
        assert!(pool.questions[1].needs_calculator);
        assert_eq!(pool.questions[2].kind, QuestionKind::MultipleChoice);
        assert!(pool.questions[2].payload.is_null());
        assert_eq!(pool.get(&QuestionId::bonus(0)).map(|q| q.kind), Some(QuestionKind::Arrangement));
    }

    #[test]
    fn parse_minimal_pool() {
        let toml = r#"
[pool]
id = "empty"
name = "Empty"
"#;
        let pool = parse_pool_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(pool.questions.is_empty());
        assert!(pool.bonus.is_empty());
        assert!(pool.description.is_empty());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let toml = r#"
[pool]
id = "bad"
name = "Bad"

[[questions]]
kind = "essay"
text = "Discuss."
"#;
        let err = parse_pool_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("unknown question kind"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_pool_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_reports_thin_pools() {
        let toml = r#"
[pool]
id = "thin"
name = "Thin"

[[questions]]
kind = "tf"
text = "  "
"#;
        let pool = parse_pool_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_pool(&pool, 9);
        assert!(warnings.iter().any(|w| w.message.contains("no bonus")));
        assert!(warnings.iter().any(|w| w.message.contains("sessions will be short")));
        assert!(warnings
            .iter()
            .any(|w| w.question_id.as_deref() == Some("q_0") && w.message.contains("empty")));
    }

    #[test]
    fn validate_clean_pool() {
        let pool = parse_pool_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert!(validate_pool(&pool, 4).is_empty());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("again.toml"), VALID_TOML).unwrap();

        let pools = load_pool_directory(dir.path()).unwrap();
        assert_eq!(pools.len(), 2);
        assert!(pools.iter().all(|p| p.id == "algebra-basics"));
    }
}
