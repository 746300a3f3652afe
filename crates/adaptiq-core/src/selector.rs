//! Session question selection.
//!
//! Each regular pool item gets a weight blending review urgency (SRS),
//! informativeness at the learner's ability (IRT) and a little uniform
//! jitter. The session is then drawn by weighted random sampling without
//! replacement, so higher-weight items are favored without every session
//! collapsing onto the same "best" items. One bonus item is appended,
//! drawn uniformly.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::irt;
use crate::model::{QuestionId, QuestionPool};
use crate::session::SessionPlan;
use crate::srs;
use crate::state::{AdaptiveState, QuestionState};
use crate::traits::RandomSource;

/// Blend of the selection weight components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    /// Multiplier on the review-urgency weight.
    #[serde(default = "default_srs_weight")]
    pub srs_weight: f64,
    /// Multiplier on the normalized information weight.
    #[serde(default = "default_irt_weight")]
    pub irt_weight: f64,
    /// Upper bound of the uniform jitter term.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_srs_weight() -> f64 {
    0.4
}
fn default_irt_weight() -> f64 {
    0.6
}
fn default_jitter() -> f64 {
    0.15
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            srs_weight: default_srs_weight(),
            irt_weight: default_irt_weight(),
            jitter: default_jitter(),
        }
    }
}

/// Learner-facing reason a question was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionTag {
    /// Never attempted.
    New,
    /// Last streak was a miss.
    Review,
    /// Attempted before, currently on a correct streak.
    Reinforcement,
}

impl QuestionTag {
    pub fn for_state(question: Option<&QuestionState>) -> Self {
        match question {
            Some(q) if q.consecutive_wrong > 0 => QuestionTag::Review,
            Some(q) if !q.attempts.is_empty() => QuestionTag::Reinforcement,
            _ => QuestionTag::New,
        }
    }
}

impl fmt::Display for QuestionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionTag::New => write!(f, "new"),
            QuestionTag::Review => write!(f, "review"),
            QuestionTag::Reinforcement => write!(f, "reinforcement"),
        }
    }
}

/// Selection data for one regular pool item.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub question_id: QuestionId,
    pub srs_weight: f64,
    pub irt_weight: f64,
    pub combined_weight: f64,
    pub tag: QuestionTag,
}

/// Score every regular pool item for the upcoming session.
pub fn score_candidates<R: RandomSource + ?Sized>(
    pool: &QuestionPool,
    state: &AdaptiveState,
    weights: &SelectionWeights,
    rng: &mut R,
) -> Vec<Candidate> {
    let current_session = state.last_session_number + 1;
    let theta = state.student.theta;

    pool.questions
        .iter()
        .enumerate()
        .map(|(index, _)| {
            let question_id = pool.regular_id(index);
            let question = state.question(&question_id);

            let srs_weight = srs::review_weight(question, current_session);
            let difficulty = question
                .map(|q| q.difficulty)
                .unwrap_or_else(|| pool.initial_difficulty(&question_id));
            let irt_weight = irt::normalized_information_weight(theta, difficulty);
            let combined_weight = weights.srs_weight * srs_weight
                + weights.irt_weight * irt_weight
                + weights.jitter * rng.next_f64();

            Candidate {
                index,
                question_id,
                srs_weight,
                irt_weight,
                combined_weight,
                tag: QuestionTag::for_state(question),
            }
        })
        .collect()
}

/// Draw `count` distinct indices from `weights`, each draw proportional to
/// the weights still remaining.
///
/// Returns `min(count, weights.len())` indices in draw order.
pub fn weighted_sample_without_replacement<R: RandomSource + ?Sized>(
    weights: &[f64],
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let mut remaining: Vec<(usize, f64)> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .enumerate()
        .collect();
    let mut picked = Vec::with_capacity(count.min(remaining.len()));

    while picked.len() < count && !remaining.is_empty() {
        let total: f64 = remaining.iter().map(|(_, w)| w).sum();

        let chosen = if total <= 0.0 {
            // Nothing left carries weight; fall back to a uniform pick.
            ((rng.next_f64() * remaining.len() as f64) as usize).min(remaining.len() - 1)
        } else {
            let mut target = rng.next_f64() * total;
            let mut chosen = None;
            let mut last_weighted = 0;
            for (pos, (_, w)) in remaining.iter().enumerate() {
                if *w <= 0.0 {
                    continue;
                }
                last_weighted = pos;
                target -= w;
                if target <= 0.0 {
                    chosen = Some(pos);
                    break;
                }
            }
            // Rounding can leave a sliver of `target`; it belongs to the last bucket.
            chosen.unwrap_or(last_weighted)
        };

        let (index, _) = remaining.remove(chosen);
        picked.push(index);
    }

    picked
}

/// Build the next session for a learner.
///
/// Reads a single snapshot of `state`; nothing is mutated.
pub fn select_session<R: RandomSource + ?Sized>(
    pool: &QuestionPool,
    state: &AdaptiveState,
    regular_count: usize,
    weights: &SelectionWeights,
    rng: &mut R,
) -> SessionPlan {
    let session_number = state.last_session_number + 1;
    let candidates = score_candidates(pool, state, weights, rng);
    let candidate_weights: Vec<f64> = candidates.iter().map(|c| c.combined_weight).collect();
    let drawn = weighted_sample_without_replacement(&candidate_weights, regular_count, rng);

    let mut items = Vec::with_capacity(drawn.len() + 1);
    let mut id_map = BTreeMap::new();
    let mut tag_map = BTreeMap::new();

    for (position, &ci) in drawn.iter().enumerate() {
        let candidate = &candidates[ci];
        items.push(pool.questions[candidate.index].clone());
        id_map.insert(position, candidate.question_id.clone());
        tag_map.insert(position, candidate.tag);
    }

    if pool.bonus.is_empty() {
        tracing::debug!(pool = %pool.id, "bonus pool is empty, session has no bonus item");
    } else {
        let bonus_index =
            ((rng.next_f64() * pool.bonus.len() as f64) as usize).min(pool.bonus.len() - 1);
        let position = items.len();
        items.push(pool.bonus[bonus_index].clone());
        id_map.insert(position, pool.bonus_id(bonus_index));
        tag_map.insert(position, QuestionTag::New);
    }

    tracing::debug!(
        session = session_number,
        regular = drawn.len(),
        total = items.len(),
        "selected session"
    );

    SessionPlan::new(session_number, items, id_map, tag_map)
}
