//! Per-learner quiz progress: best score, attempt count, last attempt.
//!
//! Kept beside the adaptive state and cleared with it on reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizProgress {
    /// Highest number of correct answers in one session. Stays `None` until
    /// a session scores above zero.
    pub best_score: Option<u32>,
    pub total_attempts: u32,
    pub last_attempt: Option<DateTime<Utc>>,
}

impl QuizProgress {
    /// Progress after one more submitted session scoring `score`.
    pub fn with_attempt(&self, score: u32, at: DateTime<Utc>) -> Self {
        let best_score = if score > self.best_score.unwrap_or(0) {
            Some(score)
        } else {
            self.best_score
        };
        Self {
            best_score,
            total_attempts: self.total_attempts + 1,
            last_attempt: Some(at),
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}
