//! Adaptive engine orchestrator.
//!
//! Ties a question pool, a state store and a random source together into the
//! per-learner session lifecycle: load state, select a session, record its
//! results, persist.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{SessionError, StoreError};
use crate::mastery::{mastery_summary, MasterySummary};
use crate::model::QuestionPool;
use crate::progress::QuizProgress;
use crate::selector::{select_session, SelectionWeights};
use crate::session::{record_session_results, SessionPlan, SessionResult};
use crate::state::AdaptiveState;
use crate::traits::StateStore;

/// Configuration for the adaptive engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Questions per session, bonus item included.
    pub questions_per_session: usize,
    /// Selection weight blend.
    pub weights: SelectionWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            questions_per_session: 9,
            weights: SelectionWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Regular items to draw for `pool`; one slot goes to the bonus item
    /// when the pool has any.
    pub fn regular_count(&self, pool: &QuestionPool) -> usize {
        if pool.bonus.is_empty() {
            self.questions_per_session
        } else {
            self.questions_per_session.saturating_sub(1)
        }
    }
}

/// The adaptive engine.
pub struct AdaptiveEngine {
    store: Arc<dyn StateStore>,
    pool: Arc<QuestionPool>,
    config: EngineConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl AdaptiveEngine {
    pub fn new(store: Arc<dyn StateStore>, pool: Arc<QuestionPool>, config: EngineConfig) -> Self {
        Self {
            store,
            pool,
            config,
            rng: Mutex::new(Box::new(ChaCha20Rng::from_entropy())),
        }
    }

    /// Replace the random source, e.g. with a seeded generator.
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Current state for a learner, fresh if nothing is stored.
    pub fn state(&self, learner: &str) -> AdaptiveState {
        self.store.load(learner)
    }

    pub fn progress(&self, learner: &str) -> QuizProgress {
        self.store.load_progress(learner)
    }

    /// Select the learner's next session from a single state snapshot.
    pub fn start_session(&self, learner: &str) -> SessionPlan {
        let state = self.store.load(learner);
        let regular_count = self.config.regular_count(&self.pool);

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let plan = select_session(&self.pool, &state, regular_count, &self.config.weights, &mut **rng);

        tracing::info!(
            learner,
            session = plan.session_number,
            questions = plan.len(),
            "session started"
        );
        plan
    }

    /// Record per-position answers for a plan and persist the new state.
    ///
    /// A plan can be submitted once; a second call fails with
    /// [`SessionError::AlreadySubmitted`]. Submitting no answers leaves the
    /// state and the plan untouched. If the stored state cannot be read the
    /// call fails with [`SessionError::StateUnavailable`] and the plan stays
    /// open.
    pub fn submit_session(
        &self,
        learner: &str,
        plan: &mut SessionPlan,
        answers: &[bool],
    ) -> Result<AdaptiveState, SessionError> {
        if plan.submitted {
            return Err(SessionError::AlreadySubmitted(plan.id));
        }
        if answers.is_empty() {
            return Ok(self.store.load(learner));
        }

        let results = plan.results_from_answers(answers)?;
        let state = self.record(learner, &results)?;
        plan.submitted = true;
        Ok(state)
    }

    /// Apply a result batch to the learner's state and progress and persist
    /// both.
    ///
    /// A store that fails to read is an error; the stored blob is left as it
    /// was rather than overwritten from a fresh state.
    pub fn record(&self, learner: &str, results: &[SessionResult]) -> Result<AdaptiveState, StoreError> {
        let state = self.store.try_load(learner)?;
        if results.is_empty() {
            return Ok(state);
        }

        let now = Utc::now();
        let next = record_session_results(&state, &self.pool, results, now);
        self.store.save(learner, &next);

        let score = results.iter().filter(|r| r.correct).count() as u32;
        match self.store.try_load_progress(learner) {
            Ok(progress) => self.store.save_progress(learner, &progress.with_attempt(score, now)),
            Err(e) => tracing::error!(learner, "progress not updated: {e}"),
        }

        tracing::info!(
            learner,
            session = next.last_session_number,
            theta = next.student.theta,
            "session recorded"
        );
        Ok(next)
    }

    pub fn mastery(&self, learner: &str) -> Option<MasterySummary> {
        mastery_summary(&self.store.load(learner), self.pool.size())
    }

    /// Discard the learner's state and progress.
    pub fn reset(&self, learner: &str) -> AdaptiveState {
        tracing::info!(learner, "resetting adaptive state");
        self.store.reset(learner)
    }
}
