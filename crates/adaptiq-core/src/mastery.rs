//! Learner-facing mastery summary.

use serde::{Deserialize, Serialize};

use crate::irt::AbilityLevel;
use crate::state::AdaptiveState;

/// Correct streak at which a question counts as mastered.
pub const MASTERED_STREAK: u32 = 3;

/// Weight of pool coverage in the overall score; mastery gets the rest.
const COVERAGE_SHARE: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterySummary {
    /// Percentage score. Attempted bonus questions count toward coverage
    /// against the regular pool size, so this can exceed 100 once bonus
    /// items are mastered on top of the whole regular pool.
    pub overall_mastery: u32,
    /// Attempted ids (bonus included) over regular pool size; may exceed 1.
    pub coverage_rate: f64,
    pub mastery_rate: f64,
    pub questions_attempted: usize,
    pub questions_mastered: usize,
    pub estimated_ability: f64,
    pub ability_label: AbilityLevel,
    pub sessions_completed: u32,
}

/// Summarize mastery against a pool of `pool_size` regular questions.
/// Every attempted id counts as covered, bonus ids included.
///
/// `None` until the learner has completed enough sessions for the numbers
/// to mean something.
pub fn mastery_summary(state: &AdaptiveState, pool_size: usize) -> Option<MasterySummary> {
    if !state.is_adaptive() {
        return None;
    }

    let questions_attempted = state.questions.len();
    let questions_mastered = state
        .questions
        .values()
        .filter(|q| q.consecutive_correct >= MASTERED_STREAK)
        .count();

    let coverage_rate = if pool_size > 0 {
        questions_attempted as f64 / pool_size as f64
    } else {
        0.0
    };
    let mastery_rate = if questions_attempted > 0 {
        questions_mastered as f64 / questions_attempted as f64
    } else {
        0.0
    };

    let overall = 100.0 * (COVERAGE_SHARE * coverage_rate + (1.0 - COVERAGE_SHARE) * mastery_rate);
    let theta = state.student.theta;

    Some(MasterySummary {
        overall_mastery: overall.round().max(0.0) as u32,
        coverage_rate,
        mastery_rate,
        questions_attempted,
        questions_mastered,
        estimated_ability: theta,
        ability_label: AbilityLevel::from_theta(theta),
        sessions_completed: state.student.total_sessions,
    })
}
