//! Per-judge scores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::competition::{EntryId, JudgeId, SessionId};
use crate::config::JudgingCriteria;
use crate::error::{CompetitionError, Result};

/// Raw component scores on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub visual: f64,
    pub aroma: f64,
    pub potency: f64,
    pub overall: f64,
}

impl ScoreBreakdown {
    pub fn new(visual: f64, aroma: f64, potency: f64, overall: f64) -> Result<Self> {
        let breakdown = Self {
            visual,
            aroma,
            potency,
            overall,
        };
        breakdown.validate()?;
        Ok(breakdown)
    }

    pub fn validate(&self) -> Result<()> {
        let components = [
            ("visual", self.visual),
            ("aroma", self.aroma),
            ("potency", self.potency),
            ("overall", self.overall),
        ];
        for (name, value) in components {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(CompetitionError::InvalidScore(format!(
                    "{} score {} is outside 0-100",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One judge's score for one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeScore {
    pub judge_id: JudgeId,
    pub entry_id: EntryId,
    pub session_id: SessionId,
    pub breakdown: ScoreBreakdown,
    /// Weighted total under the competition's criteria
    pub total_score: f64,
    #[serde(default)]
    pub comments: String,
    pub scored_at: DateTime<Utc>,
}

impl JudgeScore {
    pub fn new(
        judge_id: JudgeId,
        entry_id: EntryId,
        session_id: SessionId,
        breakdown: ScoreBreakdown,
        criteria: &JudgingCriteria,
        comments: impl Into<String>,
        scored_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_score: criteria.total_score(&breakdown),
            judge_id,
            entry_id,
            session_id,
            breakdown,
            comments: comments.into(),
            scored_at,
        }
    }
}
