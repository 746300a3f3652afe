//! Static initial-difficulty priors.
//!
//! Scale is the Rasch `b` parameter: -2 (very easy) to +2 (very hard),
//! centered at 0. Priors only seed a question's state; calibration takes
//! over once enough attempts exist.

use crate::irt::{DIFFICULTY_MAX, DIFFICULTY_MIN};
use crate::model::QuestionKind;

/// Prior for every bonus item.
pub const BONUS_PRIOR: f64 = -0.5;

/// Prior for identifiers that don't resolve to a pool item.
pub const UNKNOWN_PRIOR: f64 = 0.0;

/// Per-position jitter step.
const JITTER_STEP: f64 = 0.05;

impl QuestionKind {
    /// Difficulty prior for this kind of question.
    pub fn difficulty_prior(self) -> f64 {
        match self {
            QuestionKind::TrueFalse => -0.3,
            QuestionKind::FillBlank => 0.3,
            QuestionKind::FillBlankInline => 0.5,
            QuestionKind::MultipleChoice => -0.2,
            QuestionKind::Arrangement => 0.7,
            QuestionKind::StatementAb => 0.4,
        }
    }
}

/// Deterministic jitter so same-kind items don't share one difficulty.
///
/// Range is `[-0.25, 0.20]` in steps of 0.05.
pub fn position_jitter(index: usize) -> f64 {
    let bucket = ((index % 10) * 7 % 10) as f64;
    (bucket - 5.0) * JITTER_STEP
}

/// Initial difficulty for the regular item at `index`.
pub fn initial_difficulty(kind: QuestionKind, index: usize) -> f64 {
    (kind.difficulty_prior() + position_jitter(index)).clamp(DIFFICULTY_MIN, DIFFICULTY_MAX)
}
