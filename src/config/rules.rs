//! Entry rules and eligibility requirements

use serde::{Deserialize, Serialize};

use crate::condition::cache::{check_condition, get_or_parse};
use crate::error::Result;
use crate::submission::PlantSubmission;

/// Rules every submitted entry must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRules {
    /// Minimum plant age in days at submission
    #[serde(default)]
    pub minimum_plant_age: u32,
    /// Minimum dry yield in grams
    #[serde(default)]
    pub minimum_yield: f64,
    #[serde(default = "default_require_documentation")]
    pub require_documentation: bool,
    /// Checked in order at finalization; the first match rejects the entry
    #[serde(default)]
    pub disqualification_criteria: Vec<DisqualificationCriterion>,
}

fn default_require_documentation() -> bool {
    true
}

impl Default for CompetitionRules {
    fn default() -> Self {
        Self {
            minimum_plant_age: 0,
            minimum_yield: 0.0,
            require_documentation: true,
            disqualification_criteria: Vec::new(),
        }
    }
}

/// A named condition that disqualifies a submission when it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisqualificationCriterion {
    pub reason: String,
    /// Condition over submission metrics, e.g. `"THC>35 | CTM?[1,2]"`
    pub condition: String,
}

impl CompetitionRules {
    /// Parse every criterion once so that bad expressions surface at load time
    pub fn validate(&self) -> Result<()> {
        for criterion in &self.disqualification_criteria {
            get_or_parse(&criterion.condition)?;
        }
        Ok(())
    }

    /// Reason of the first criterion matched by the submission, if any
    pub fn disqualification_for(&self, submission: &PlantSubmission) -> Result<Option<&str>> {
        for criterion in &self.disqualification_criteria {
            if check_condition(&criterion.condition, submission)? {
                return Ok(Some(criterion.reason.as_str()));
            }
        }
        Ok(None)
    }
}

/// Participant eligibility requirements for registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitionRequirements {
    pub minimum_skill_level: u32,
    pub minimum_age: u32,
    pub minimum_competitions: u32,
    pub region_restricted: bool,
    pub eligible_regions: Vec<String>,
    pub required_certifications: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::test_support::sample_submission;

    fn rules_with(criteria: &[(&str, &str)]) -> CompetitionRules {
        CompetitionRules {
            disqualification_criteria: criteria
                .iter()
                .map(|(reason, condition)| DisqualificationCriterion {
                    reason: reason.to_string(),
                    condition: condition.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_matching_reason_wins() {
        let mut submission = sample_submission();
        submission.cannabinoids.thc = 38.0;
        submission.contaminants = vec![4];

        let rules = rules_with(&[
            ("Pesticide residue detected", "CTM?[3,4]"),
            ("Implausible potency", "THC>35"),
        ]);
        assert_eq!(
            rules.disqualification_for(&submission).unwrap(),
            Some("Pesticide residue detected")
        );
    }

    #[test]
    fn test_no_match() {
        let rules = rules_with(&[("Implausible potency", "THC>35")]);
        assert_eq!(rules.disqualification_for(&sample_submission()).unwrap(), None);
    }

    #[test]
    fn test_validate_rejects_unparseable_condition() {
        let rules = rules_with(&[("broken", "(THC>35")]);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let rules: CompetitionRules = serde_json::from_str("{}").unwrap();
        assert!(rules.require_documentation);
        assert_eq!(rules.minimum_plant_age, 0);

        let req: CompetitionRequirements = serde_json::from_str("{}").unwrap();
        assert!(!req.region_restricted);
    }
}
