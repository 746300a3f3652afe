//! Rasch (one-parameter IRT) model: response probability, Fisher
//! information, ability updates and item difficulty calibration.
//!
//! P(correct) = 1 / (1 + e^-(θ - b))
//!
//! Everything here is a pure function of its inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::QuestionState;

pub const THETA_MIN: f64 = -3.0;
pub const THETA_MAX: f64 = 3.0;
pub const DIFFICULTY_MIN: f64 = -2.0;
pub const DIFFICULTY_MAX: f64 = 2.0;

/// Fisher information of a Rasch item at θ = b.
pub const MAX_INFORMATION: f64 = 0.25;

/// Damping applied to each Newton-Raphson step on θ.
pub const ABILITY_LEARNING_RATE: f64 = 0.5;

/// Step size of difficulty recalibration.
pub const DIFFICULTY_LEARNING_RATE: f64 = 0.3;

/// Attempts required before a question's difficulty is recalibrated.
pub const MIN_ATTEMPTS_TO_CALIBRATE: usize = 5;

/// Below this total information the ability update is skipped.
const MIN_TOTAL_INFORMATION: f64 = 0.001;

/// One scored response used for an ability update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemResponse {
    pub difficulty: f64,
    pub correct: bool,
}

/// Probability that a learner of ability `theta` answers an item of
/// difficulty `difficulty` correctly.
pub fn probability_correct(theta: f64, difficulty: f64) -> f64 {
    1.0 / (1.0 + (-(theta - difficulty)).exp())
}

/// Fisher information `p(1-p)`: how much presenting this item tells us
/// about ability at `theta`. Peaks at 0.25 when `theta == difficulty`.
pub fn information_at(theta: f64, difficulty: f64) -> f64 {
    let p = probability_correct(theta, difficulty);
    p * (1.0 - p)
}

/// Fisher information scaled to `[0, 1]`, used as a selection weight.
pub fn normalized_information_weight(theta: f64, difficulty: f64) -> f64 {
    information_at(theta, difficulty) / MAX_INFORMATION
}

/// Update an ability estimate with one damped Newton-Raphson step on the
/// Rasch log-likelihood of a session's responses.
///
/// θ' = clamp(θ + 0.5 · Σ(x_i - p_i) / Σ p_i(1 - p_i), -3, 3)
///
/// Returns `theta` unchanged for an empty batch or when the batch carries
/// (almost) no information, e.g. every item is trivially easy or hard.
pub fn update_ability(theta: f64, responses: &[ItemResponse]) -> f64 {
    if responses.is_empty() {
        return theta;
    }

    let (numerator, denominator) =
        responses
            .iter()
            .fold((0.0f64, 0.0f64), |(num, den), r| {
                let p = probability_correct(theta, r.difficulty);
                let observed = if r.correct { 1.0 } else { 0.0 };
                (num + (observed - p), den + p * (1.0 - p))
            });

    if denominator < MIN_TOTAL_INFORMATION {
        tracing::debug!(
            theta,
            denominator,
            "skipping ability update: session carries no information"
        );
        return theta;
    }

    let step = ABILITY_LEARNING_RATE * (numerator / denominator);
    (theta + step).clamp(THETA_MIN, THETA_MAX)
}

/// Recalibrate a question's difficulty from its recent attempt history.
///
/// Deferred (returns the current difficulty) until the question has at least
/// [`MIN_ATTEMPTS_TO_CALIBRATE`] attempts. Doing better than the model expects
/// makes the item easier (b decreases); doing worse makes it harder.
pub fn calibrate_difficulty(question: &QuestionState, theta: f64) -> f64 {
    let attempts = question.attempts.len();
    if attempts < MIN_ATTEMPTS_TO_CALIBRATE {
        return question.difficulty;
    }

    let correct = question.attempts.iter().filter(|a| a.correct).count();
    let observed_rate = correct as f64 / attempts as f64;
    let expected_rate = probability_correct(theta, question.difficulty);

    let adjusted = question.difficulty + DIFFICULTY_LEARNING_RATE * (expected_rate - observed_rate);
    adjusted.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX)
}

/// Coarse, learner-facing band of an ability estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityLevel {
    Beginner,
    Developing,
    Proficient,
    Advanced,
}

impl AbilityLevel {
    pub fn from_theta(theta: f64) -> Self {
        if theta < -0.5 {
            AbilityLevel::Beginner
        } else if theta <= 0.5 {
            AbilityLevel::Developing
        } else if theta <= 1.5 {
            AbilityLevel::Proficient
        } else {
            AbilityLevel::Advanced
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AbilityLevel::Beginner => "Beginner",
            AbilityLevel::Developing => "Developing",
            AbilityLevel::Proficient => "Proficient",
            AbilityLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for AbilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
