//! Judging criteria weights

use serde::{Deserialize, Serialize};

use crate::error::{CompetitionError, Result};
use crate::judging::ScoreBreakdown;

/// Maximum allowed deviation of the weight sum from 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-4;

/// Weights applied to each score component.
///
/// A `JudgingCriteria` can only be built through [`JudgingCriteria::new`] (or
/// deserialization, which goes through the same check), so every value in circulation has
/// non-negative weights summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CriteriaWeights")]
pub struct JudgingCriteria {
    visual_weight: f64,
    aroma_weight: f64,
    potency_weight: f64,
    overall_weight: f64,
}

#[derive(Deserialize)]
struct CriteriaWeights {
    visual_weight: f64,
    aroma_weight: f64,
    potency_weight: f64,
    overall_weight: f64,
}

impl TryFrom<CriteriaWeights> for JudgingCriteria {
    type Error = CompetitionError;

    fn try_from(w: CriteriaWeights) -> Result<Self> {
        JudgingCriteria::new(w.visual_weight, w.aroma_weight, w.potency_weight, w.overall_weight)
    }
}

impl JudgingCriteria {
    pub fn new(visual: f64, aroma: f64, potency: f64, overall: f64) -> Result<Self> {
        let weights = [visual, aroma, potency, overall];
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(CompetitionError::InvalidWeights(format!(
                "weight {} must be a finite, non-negative number",
                bad
            )));
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(CompetitionError::InvalidWeights(format!(
                "weights sum to {}, expected 1.0",
                sum
            )));
        }

        Ok(Self {
            visual_weight: visual,
            aroma_weight: aroma,
            potency_weight: potency,
            overall_weight: overall,
        })
    }

    pub fn visual_weight(&self) -> f64 {
        self.visual_weight
    }

    pub fn aroma_weight(&self) -> f64 {
        self.aroma_weight
    }

    pub fn potency_weight(&self) -> f64 {
        self.potency_weight
    }

    pub fn overall_weight(&self) -> f64 {
        self.overall_weight
    }

    /// Weighted total of a score breakdown
    #[inline]
    pub fn total_score(&self, breakdown: &ScoreBreakdown) -> f64 {
        breakdown.visual * self.visual_weight
            + breakdown.aroma * self.aroma_weight
            + breakdown.potency * self.potency_weight
            + breakdown.overall * self.overall_weight
    }
}

impl Default for JudgingCriteria {
    fn default() -> Self {
        Self {
            visual_weight: 0.25,
            aroma_weight: 0.25,
            potency_weight: 0.30,
            overall_weight: 0.20,
        }
    }
}
