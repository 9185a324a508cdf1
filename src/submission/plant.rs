//! Plant submission snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::competition::PlantId;
use crate::error::{CompetitionError, Result};

/// Cannabinoid content, in percent of dry weight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannabinoidProfile {
    pub thc: f64,
    pub cbd: f64,
    pub cbg: f64,
    pub cbn: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerpeneProfile {
    /// Dominant terpenes, strongest first
    pub dominant: Vec<String>,
    /// Total terpene content, in percent of dry weight
    pub total_percent: f64,
}

/// Visual assessment on a 0-100 scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualProfile {
    pub trichome_density: f64,
    pub color_score: f64,
    pub structure_score: f64,
}

/// Aroma assessment on a 0-100 scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AromaProfile {
    pub intensity: f64,
    pub complexity: f64,
    pub notes: Vec<String>,
}

/// Outcome of a cultivated plant, captured when it is entered into a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSubmission {
    pub plant_id: PlantId,
    pub strain_name: String,
    pub plant_age_days: u32,
    pub yield_grams: f64,
    #[serde(default)]
    pub cannabinoids: CannabinoidProfile,
    #[serde(default)]
    pub terpenes: TerpeneProfile,
    #[serde(default)]
    pub visual: VisualProfile,
    #[serde(default)]
    pub aroma: AromaProfile,
    /// Lab contaminant codes found in the sample
    #[serde(default)]
    pub contaminants: Vec<i32>,
    pub captured_at: DateTime<Utc>,
}

impl PlantSubmission {
    /// Reject physically impossible measurements
    pub fn validate(&self) -> Result<()> {
        if !self.yield_grams.is_finite() || self.yield_grams < 0.0 {
            return Err(malformed("yield must be a non-negative number"));
        }

        let percentages = [
            ("THC", self.cannabinoids.thc),
            ("CBD", self.cannabinoids.cbd),
            ("CBG", self.cannabinoids.cbg),
            ("CBN", self.cannabinoids.cbn),
            ("terpene total", self.terpenes.total_percent),
        ];
        for (name, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(malformed(&format!("{} must be between 0 and 100%", name)));
            }
        }

        let cannabinoid_total = self.cannabinoids.thc
            + self.cannabinoids.cbd
            + self.cannabinoids.cbg
            + self.cannabinoids.cbn;
        if cannabinoid_total > 100.0 {
            return Err(malformed("cannabinoid content exceeds 100%"));
        }

        let scores = [
            self.visual.trichome_density,
            self.visual.color_score,
            self.visual.structure_score,
            self.aroma.intensity,
            self.aroma.complexity,
        ];
        if scores.iter().any(|s| !(0.0..=100.0).contains(s)) {
            return Err(malformed("visual and aroma scores must be between 0 and 100"));
        }

        Ok(())
    }
}

fn malformed(message: &str) -> CompetitionError {
    CompetitionError::IneligibleSubmission(format!("malformed submission: {}", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::test_support::sample_submission;

    #[test]
    fn test_sample_is_valid() {
        sample_submission().validate().unwrap();
    }

    #[test]
    fn test_negative_yield_rejected() {
        let mut s = sample_submission();
        s.yield_grams = -1.0;
        assert!(matches!(
            s.validate(),
            Err(CompetitionError::IneligibleSubmission(_))
        ));
    }

    #[test]
    fn test_cannabinoid_total_bounded() {
        let mut s = sample_submission();
        s.cannabinoids.thc = 60.0;
        s.cannabinoids.cbd = 45.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_nan_score_rejected() {
        let mut s = sample_submission();
        s.aroma.intensity = f64::NAN;
        assert!(s.validate().is_err());
    }
}
