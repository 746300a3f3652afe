//! Persisted per-learner model: ability history plus sparse per-question
//! records.
//!
//! The JSON shape (camelCase fields, millisecond timestamps) is the
//! persistence contract; stores treat the blob as opaque beyond it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::QuestionId;
use crate::srs;

/// Schema version written into every blob.
pub const STATE_VERSION: u32 = 1;

/// Attempts kept per question; older ones are dropped from the front.
pub const MAX_ATTEMPTS_PER_QUESTION: usize = 10;

/// Ability snapshots kept in the learner's history.
pub const MAX_THETA_HISTORY: usize = 20;

/// Sessions required before adaptive feedback and mastery are shown.
pub const MIN_SESSIONS_FOR_ADAPTIVE: u32 = 3;

/// A single answered attempt at a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttempt {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub correct: bool,
    pub session_number: u32,
}

/// Scheduling and difficulty record of one question for one learner.
///
/// Exactly one streak counter is nonzero after any attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionState {
    pub id: QuestionId,
    pub attempts: Vec<QuestionAttempt>,
    pub consecutive_correct: u32,
    pub consecutive_wrong: u32,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub next_eligible_session: u32,
    /// Rasch `b` parameter, in `[-2, 2]`.
    pub difficulty: f64,
}

impl QuestionState {
    /// State of a question that has never been attempted.
    pub fn fresh(id: QuestionId, prior: f64) -> Self {
        Self {
            id,
            attempts: Vec::new(),
            consecutive_correct: 0,
            consecutive_wrong: 0,
            last_seen: None,
            next_eligible_session: 0,
            difficulty: prior,
        }
    }

    /// The state after one more attempt in session `session`.
    ///
    /// Difficulty is carried over untouched; recalibration is a separate step.
    pub fn with_attempt(&self, correct: bool, session: u32, now: DateTime<Utc>) -> Self {
        let mut attempts = Vec::with_capacity(MAX_ATTEMPTS_PER_QUESTION);
        let keep = self.attempts.len().saturating_sub(MAX_ATTEMPTS_PER_QUESTION - 1);
        attempts.extend_from_slice(&self.attempts[keep..]);
        attempts.push(QuestionAttempt {
            timestamp: now,
            correct,
            session_number: session,
        });

        let (consecutive_correct, consecutive_wrong) = if correct {
            (self.consecutive_correct + 1, 0)
        } else {
            (0, self.consecutive_wrong + 1)
        };

        let next_eligible_session = if correct {
            srs::next_eligible_session(session, consecutive_correct)
        } else {
            session + 1
        };

        Self {
            id: self.id.clone(),
            attempts,
            consecutive_correct,
            consecutive_wrong,
            last_seen: Some(now),
            next_eligible_session,
            difficulty: self.difficulty,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.correct).count()
    }
}

/// One entry of the ability trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThetaSnapshot {
    pub session: u32,
    pub theta: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Learner ability model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentModel {
    /// Ability estimate, in `[-3, 3]`.
    pub theta: f64,
    pub theta_history: Vec<ThetaSnapshot>,
    pub total_sessions: u32,
    pub total_questions_answered: u64,
    pub total_correct: u64,
}

impl Default for StudentModel {
    fn default() -> Self {
        Self {
            theta: 0.0,
            theta_history: Vec::new(),
            total_sessions: 0,
            total_questions_answered: 0,
            total_correct: 0,
        }
    }
}

/// Root persisted object, one per learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveState {
    pub version: u32,
    pub student: StudentModel,
    /// Sparse: only questions attempted at least once.
    pub questions: BTreeMap<QuestionId, QuestionState>,
    /// Completed sessions; the scheduling clock.
    pub last_session_number: u32,
}

impl Default for AdaptiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveState {
    /// Fresh state: θ = 0, no questions, session 0.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            student: StudentModel::default(),
            questions: BTreeMap::new(),
            last_session_number: 0,
        }
    }

    pub fn question(&self, id: &QuestionId) -> Option<&QuestionState> {
        self.questions.get(id)
    }

    /// Whether enough sessions exist for adaptive feedback to be meaningful.
    pub fn is_adaptive(&self) -> bool {
        self.student.total_sessions >= MIN_SESSIONS_FOR_ADAPTIVE
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    /// Parse a stored blob, rejecting unknown schema versions.
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| StoreError::Corrupt("missing version".into()))?;
        if version != u64::from(STATE_VERSION) {
            return Err(StoreError::UnsupportedVersion {
                found: version,
                expected: STATE_VERSION,
            });
        }

        serde_json::from_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}
