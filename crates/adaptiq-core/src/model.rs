//! Core data model types for adaptiq.
//!
//! These are the question-side types the whole system uses: stable question
//! identifiers, the closed set of question kinds, and the question pool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::metadata;

/// Stable identifier of a pool item.
///
/// Identifiers are positional: `q_<index>` for regular items and
/// `b_<index>` for bonus items. An identifier is never reused for different
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

/// Where a [`QuestionId`] points inside a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionRef {
    pub index: usize,
    pub is_bonus: bool,
}

impl QuestionId {
    pub fn regular(index: usize) -> Self {
        Self(format!("q_{index}"))
    }

    pub fn bonus(index: usize) -> Self {
        Self(format!("b_{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the pool position this identifier refers to.
    ///
    /// Returns `None` for identifiers that don't follow the positional scheme.
    pub fn parse(&self) -> Option<QuestionRef> {
        let (prefix, index) = self.0.split_once('_')?;
        let is_bonus = match prefix {
            "q" => false,
            "b" => true,
            _ => return None,
        };
        let index = index.parse().ok()?;
        Some(QuestionRef { index, is_bonus })
    }

    pub fn is_bonus(&self) -> bool {
        self.0.starts_with("b_")
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Supported question kinds. Only used to seed the difficulty prior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    FillBlankInline,
    Arrangement,
    StatementAb,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple-choice"),
            QuestionKind::TrueFalse => write!(f, "true-false"),
            QuestionKind::FillBlank => write!(f, "fill-blank"),
            QuestionKind::FillBlankInline => write!(f, "fill-blank-inline"),
            QuestionKind::Arrangement => write!(f, "arrangement"),
            QuestionKind::StatementAb => write!(f, "statement-ab"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "mc" => Ok(QuestionKind::MultipleChoice),
            "true-false" | "tf" => Ok(QuestionKind::TrueFalse),
            "fill-blank" => Ok(QuestionKind::FillBlank),
            "fill-blank-inline" => Ok(QuestionKind::FillBlankInline),
            "arrangement" => Ok(QuestionKind::Arrangement),
            "statement-ab" => Ok(QuestionKind::StatementAb),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A single pool item handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// Question kind, used for the difficulty prior.
    pub kind: QuestionKind,
    /// Question text shown to the learner.
    pub text: String,
    /// Whether the renderer should offer a calculator.
    #[serde(default)]
    pub needs_calculator: bool,
    /// Explanation shown on the results screen.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Renderer-specific data (options, blanks, correct answers, ...).
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// An ordered, fixed question pool plus its separate bonus pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPool {
    /// Unique identifier for this pool.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this pool.
    #[serde(default)]
    pub description: String,
    /// Regular items, subject to scheduling and ability matching.
    #[serde(default)]
    pub questions: Vec<QuestionItem>,
    /// Bonus items, drawn uniformly one per session.
    #[serde(default)]
    pub bonus: Vec<QuestionItem>,
}

impl QuestionPool {
    pub fn regular_id(&self, index: usize) -> QuestionId {
        QuestionId::regular(index)
    }

    pub fn bonus_id(&self, index: usize) -> QuestionId {
        QuestionId::bonus(index)
    }

    /// Number of regular items; the denominator of mastery coverage.
    pub fn size(&self) -> usize {
        self.questions.len()
    }

    /// Look up the item an identifier points at.
    pub fn get(&self, id: &QuestionId) -> Option<&QuestionItem> {
        let r = id.parse()?;
        if r.is_bonus {
            self.bonus.get(r.index)
        } else {
            self.questions.get(r.index)
        }
    }

    /// Initial difficulty prior for an identifier.
    ///
    /// Unknown identifiers fall back to the neutral prior instead of failing.
    pub fn initial_difficulty(&self, id: &QuestionId) -> f64 {
        match id.parse() {
            Some(r) if r.is_bonus => metadata::BONUS_PRIOR,
            Some(r) => match self.questions.get(r.index) {
                Some(item) => metadata::initial_difficulty(item.kind, r.index),
                None => metadata::UNKNOWN_PRIOR,
            },
            None if id.is_bonus() => metadata::BONUS_PRIOR,
            None => metadata::UNKNOWN_PRIOR,
        }
    }
}
