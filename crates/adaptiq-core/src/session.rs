//! Session descriptors and the session-results state transition.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::irt::{self, ItemResponse, MIN_ATTEMPTS_TO_CALIBRATE};
use crate::model::{QuestionId, QuestionItem, QuestionPool};
use crate::selector::QuestionTag;
use crate::state::{AdaptiveState, QuestionState, StudentModel, ThetaSnapshot, MAX_THETA_HISTORY};

/// The outcome of one question in a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub question_id: QuestionId,
    pub correct: bool,
}

impl SessionResult {
    pub fn new(question_id: impl Into<QuestionId>, correct: bool) -> Self {
        Self {
            question_id: question_id.into(),
            correct,
        }
    }
}

/// A selected session, handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Unique plan identifier.
    pub id: Uuid,
    /// The session index this plan was drawn for.
    pub session_number: u32,
    /// When the plan was drawn.
    pub created_at: DateTime<Utc>,
    /// Questions in presentation order.
    pub items: Vec<QuestionItem>,
    /// Position → stable question id.
    pub id_map: BTreeMap<usize, QuestionId>,
    /// Position → feedback tag.
    pub tag_map: BTreeMap<usize, QuestionTag>,
    /// Set once the plan's results have been recorded.
    #[serde(default)]
    pub submitted: bool,
}

impl SessionPlan {
    pub fn new(
        session_number: u32,
        items: Vec<QuestionItem>,
        id_map: BTreeMap<usize, QuestionId>,
        tag_map: BTreeMap<usize, QuestionTag>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_number,
            created_at: Utc::now(),
            items,
            id_map,
            tag_map,
            submitted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the bonus item, if the plan has one.
    pub fn bonus_position(&self) -> Option<usize> {
        self.id_map
            .iter()
            .find(|(_, id)| id.is_bonus())
            .map(|(pos, _)| *pos)
    }

    /// Pair per-position correctness with the planned question ids.
    pub fn results_from_answers(&self, answers: &[bool]) -> Result<Vec<SessionResult>, SessionError> {
        if answers.len() != self.items.len() {
            return Err(SessionError::AnswerCountMismatch {
                expected: self.items.len(),
                got: answers.len(),
            });
        }

        Ok(answers
            .iter()
            .enumerate()
            .filter_map(|(pos, &correct)| {
                self.id_map
                    .get(&pos)
                    .map(|id| SessionResult::new(id.clone(), correct))
            })
            .collect())
    }

    /// Save the plan as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session plan")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session plan to {}", path.display()))?;
        Ok(())
    }

    /// Load a plan from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session plan from {}", path.display()))?;
        let plan: SessionPlan =
            serde_json::from_str(&content).context("failed to parse session plan JSON")?;
        Ok(plan)
    }
}

/// Apply one completed session to a learner's state.
///
/// Returns a new state; the input is untouched. An empty batch returns an
/// identical copy with no counters bumped. Question ids that don't resolve
/// to a pool item are recorded with the neutral prior.
pub fn record_session_results(
    state: &AdaptiveState,
    pool: &QuestionPool,
    results: &[SessionResult],
    now: DateTime<Utc>,
) -> AdaptiveState {
    if results.is_empty() {
        return state.clone();
    }

    let next_session = state.last_session_number + 1;
    let mut questions = state.questions.clone();

    for r in results {
        let base = match questions.get(&r.question_id) {
            Some(existing) => existing.clone(),
            None => {
                if pool.get(&r.question_id).is_none() {
                    tracing::warn!(question = %r.question_id, "result for unknown question, using default prior");
                }
                QuestionState::fresh(r.question_id.clone(), pool.initial_difficulty(&r.question_id))
            }
        };
        questions.insert(r.question_id.clone(), base.with_attempt(r.correct, next_session, now));
    }

    let responses: Vec<ItemResponse> = results
        .iter()
        .filter_map(|r| {
            questions.get(&r.question_id).map(|q| ItemResponse {
                difficulty: q.difficulty,
                correct: r.correct,
            })
        })
        .collect();
    let new_theta = irt::update_ability(state.student.theta, &responses);

    for r in results {
        if let Some(q) = questions.get_mut(&r.question_id) {
            if q.attempts.len() >= MIN_ATTEMPTS_TO_CALIBRATE {
                q.difficulty = irt::calibrate_difficulty(q, new_theta);
            }
        }
    }

    let mut theta_history = state.student.theta_history.clone();
    theta_history.push(ThetaSnapshot {
        session: next_session,
        theta: new_theta,
        timestamp: now,
    });
    if theta_history.len() > MAX_THETA_HISTORY {
        theta_history.drain(..theta_history.len() - MAX_THETA_HISTORY);
    }

    let correct = results.iter().filter(|r| r.correct).count() as u64;

    tracing::debug!(
        session = next_session,
        answered = results.len(),
        correct,
        theta_before = state.student.theta,
        theta_after = new_theta,
        "recorded session results"
    );

    AdaptiveState {
        version: state.version,
        student: StudentModel {
            theta: new_theta,
            theta_history,
            total_sessions: state.student.total_sessions + 1,
            total_questions_answered: state.student.total_questions_answered + results.len() as u64,
            total_correct: state.student.total_correct + correct,
        },
        questions,
        last_session_number: next_session,
    }
}
