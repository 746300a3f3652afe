//! Results-screen feedback for a finished session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::irt::AbilityLevel;
use crate::model::QuestionId;
use crate::selector::QuestionTag;
use crate::session::SessionPlan;

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT: u32 = 2;

/// Outcome of one plan position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionOutcome {
    pub position: usize,
    pub question_id: QuestionId,
    /// Feedback tag, `None` once tags are hidden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<QuestionTag>,
    pub correct: bool,
    pub is_bonus: bool,
    pub points: u32,
}

/// How a tag group fared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagTally {
    pub tag: QuestionTag,
    pub seen: usize,
    pub correct: usize,
}

/// Ability before and after recording the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityChange {
    pub before: f64,
    pub after: f64,
}

impl AbilityChange {
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}

/// Per-session results report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub plan_id: Uuid,
    pub session_number: u32,
    pub outcomes: Vec<PositionOutcome>,
    pub correct: usize,
    pub total: usize,
    pub points: u32,
    pub total_points: u32,
    pub tags: Vec<TagTally>,
    #[serde(default)]
    pub ability: Option<AbilityChange>,
}

impl SessionReport {
    /// Pair a plan with per-position correctness.
    pub fn build(plan: &SessionPlan, answers: &[bool]) -> Result<Self, SessionError> {
        if answers.len() != plan.len() {
            return Err(SessionError::AnswerCountMismatch {
                expected: plan.len(),
                got: answers.len(),
            });
        }

        let outcomes: Vec<PositionOutcome> = plan
            .id_map
            .iter()
            .filter_map(|(&position, id)| {
                let correct = *answers.get(position)?;
                Some(PositionOutcome {
                    position,
                    question_id: id.clone(),
                    tag: Some(plan.tag_map.get(&position).copied().unwrap_or(QuestionTag::New)),
                    correct,
                    is_bonus: id.is_bonus(),
                    points: if correct { POINTS_PER_CORRECT } else { 0 },
                })
            })
            .collect();

        let tags = [QuestionTag::New, QuestionTag::Review, QuestionTag::Reinforcement]
            .into_iter()
            .filter_map(|tag| {
                let group: Vec<_> = outcomes.iter().filter(|o| o.tag == Some(tag)).collect();
                if group.is_empty() {
                    return None;
                }
                Some(TagTally {
                    tag,
                    seen: group.len(),
                    correct: group.iter().filter(|o| o.correct).count(),
                })
            })
            .collect();

        let correct = outcomes.iter().filter(|o| o.correct).count();
        let total = outcomes.len();

        Ok(Self {
            plan_id: plan.id,
            session_number: plan.session_number,
            points: outcomes.iter().map(|o| o.points).sum(),
            total_points: total as u32 * POINTS_PER_CORRECT,
            outcomes,
            correct,
            total,
            tags,
            ability: None,
        })
    }

    /// Keep the feedback tags only for a learner past the adaptive
    /// threshold; earlier sessions are all `new` and carry no signal.
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        if !adaptive {
            for o in &mut self.outcomes {
                o.tag = None;
            }
            self.tags.clear();
        }
        self
    }

    pub fn shows_tags(&self) -> bool {
        self.outcomes.iter().any(|o| o.tag.is_some())
    }

    pub fn with_ability(mut self, before: f64, after: f64) -> Self {
        self.ability = Some(AbilityChange { before, after });
        self
    }

    /// Fraction answered correctly, 0.0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Generate a markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Session {}\n\n", self.session_number));
        md.push_str(&format!(
            "**Score:** {}/{} correct ({:.0}%), {}/{} points\n\n",
            self.correct,
            self.total,
            self.accuracy() * 100.0,
            self.points,
            self.total_points
        ));

        if let Some(a) = &self.ability {
            md.push_str(&format!(
                "**Ability:** {:.2} → {:.2} ({:+.2}, {})\n\n",
                a.before,
                a.after,
                a.delta(),
                AbilityLevel::from_theta(a.after)
            ));
        }

        let show_tags = self.shows_tags();
        if show_tags {
            md.push_str("| # | Question | Tag | Result | Points |\n");
            md.push_str("|---|----------|-----|--------|--------|\n");
        } else {
            md.push_str("| # | Question | Result | Points |\n");
            md.push_str("|---|----------|--------|--------|\n");
        }
        for o in &self.outcomes {
            let id = if o.is_bonus {
                format!("{} (bonus)", o.question_id)
            } else {
                o.question_id.to_string()
            };
            let tag = match o.tag {
                Some(tag) if show_tags => format!(" {tag} |"),
                _ if show_tags => " - |".to_string(),
                _ => String::new(),
            };
            md.push_str(&format!(
                "| {} | {} |{} {} | {} |\n",
                o.position + 1,
                id,
                tag,
                if o.correct { "correct" } else { "wrong" },
                o.points
            ));
        }

        if !self.tags.is_empty() {
            md.push_str("\n| Tag | Correct | Seen |\n");
            md.push_str("|-----|---------|------|\n");
            for t in &self.tags {
                md.push_str(&format!("| {} | {} | {} |\n", t.tag, t.correct, t.seen));
            }
        }

        md
    }
}
