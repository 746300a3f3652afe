//! Spaced-repetition scheduling over a fixed interval table.
//!
//! | consecutive correct | sessions until due |
//! |---------------------|--------------------|
//! | 0                   | 1                  |
//! | 1                   | 2                  |
//! | 2                   | 4                  |
//! | 3                   | 8                  |
//! | 4+                  | 15                 |

use crate::state::QuestionState;

/// Review intervals in sessions, indexed by `min(consecutive_correct, 4)`.
pub const INTERVAL_TABLE: [u32; 5] = [1, 2, 4, 8, 15];

/// Weight of a question the learner has never attempted.
pub const NEW_WEIGHT: f64 = 0.6;
/// Weight of a question whose last attempt was wrong.
pub const MISSED_WEIGHT: f64 = 0.9;
/// Weight of a question the schedule says is due.
pub const DUE_WEIGHT: f64 = 1.0;
/// Weight of a question that is not yet due. Nonzero so it can still surface.
pub const NOT_DUE_WEIGHT: f64 = 0.1;

/// Session index at which a question becomes due again.
pub fn next_eligible_session(current_session: u32, consecutive_correct: u32) -> u32 {
    let idx = (consecutive_correct as usize).min(INTERVAL_TABLE.len() - 1);
    current_session + INTERVAL_TABLE[idx]
}

/// How urgently a question needs review, in `[0, 1]`.
pub fn review_weight(question: Option<&QuestionState>, current_session: u32) -> f64 {
    let Some(q) = question else {
        return NEW_WEIGHT;
    };

    if q.consecutive_wrong > 0 {
        MISSED_WEIGHT
    } else if current_session >= q.next_eligible_session {
        DUE_WEIGHT
    } else {
        NOT_DUE_WEIGHT
    }
}
