//! Participant qualification check

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::competition::CompetitorId;
use crate::config::CompetitionRequirements;
use crate::error::{CompetitionError, Result};

/// What the registry knows about a competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub competitor_id: CompetitorId,
    pub display_name: String,
    pub skill_level: u32,
    /// Player age in years
    pub age: u32,
    #[serde(default)]
    pub competitions_entered: u32,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub certifications: Vec<String>,
}

/// Individual checks, in the order they are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationCheck {
    SkillLevel,
    Age,
    CompetitionHistory,
    Region,
    Certifications,
}

impl fmt::Display for QualificationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualificationCheck::SkillLevel => "skill level",
            QualificationCheck::Age => "age",
            QualificationCheck::CompetitionHistory => "competition history",
            QualificationCheck::Region => "region",
            QualificationCheck::Certifications => "certifications",
        };
        f.write_str(name)
    }
}

/// Outcome of checking a profile against competition requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationResult {
    pub is_qualified: bool,
    /// Names the first unmet requirement
    pub failure_reason: Option<String>,
    /// Every unmet requirement, in evaluation order
    pub failed_checks: Vec<QualificationCheck>,
}

impl QualificationResult {
    /// `Ok` when qualified, otherwise *QualificationFailed* carrying the reason verbatim
    pub fn into_result(self) -> Result<()> {
        match self.failure_reason {
            None if self.is_qualified => Ok(()),
            reason => Err(CompetitionError::QualificationFailed(
                reason.unwrap_or_else(|| "not qualified".to_string()),
            )),
        }
    }
}

/// Check a profile against requirements. Pure; the first failing check names the reason.
pub fn check_qualification(
    profile: &ParticipantProfile,
    requirements: &CompetitionRequirements,
) -> QualificationResult {
    let mut failures: Vec<(QualificationCheck, String)> = Vec::new();

    if profile.skill_level < requirements.minimum_skill_level {
        failures.push((
            QualificationCheck::SkillLevel,
            format!(
                "Skill level {} is below the required level {}",
                profile.skill_level, requirements.minimum_skill_level
            ),
        ));
    }

    if profile.age < requirements.minimum_age {
        failures.push((
            QualificationCheck::Age,
            format!(
                "Age {} is below the minimum age {}",
                profile.age, requirements.minimum_age
            ),
        ));
    }

    if profile.competitions_entered < requirements.minimum_competitions {
        failures.push((
            QualificationCheck::CompetitionHistory,
            format!(
                "{} previous competitions entered, {} required",
                profile.competitions_entered, requirements.minimum_competitions
            ),
        ));
    }

    if requirements.region_restricted && !requirements.eligible_regions.contains(&profile.region)
    {
        failures.push((
            QualificationCheck::Region,
            format!("Region '{}' is not eligible", profile.region),
        ));
    }

    let missing: Vec<&str> = requirements
        .required_certifications
        .iter()
        .filter(|c| !profile.certifications.contains(c))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        failures.push((
            QualificationCheck::Certifications,
            format!("Missing required certifications: {}", missing.join(", ")),
        ));
    }

    QualificationResult {
        is_qualified: failures.is_empty(),
        failure_reason: failures.first().map(|(_, reason)| reason.clone()),
        failed_checks: failures.into_iter().map(|(check, _)| check).collect(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn veteran_profile() -> ParticipantProfile {
        ParticipantProfile {
            competitor_id: CompetitorId::new("grower-1"),
            display_name: "Mary Jane".into(),
            skill_level: 5,
            age: 30,
            competitions_entered: 4,
            region: "pacific".into(),
            certifications: vec!["organic".into(), "lab-tested".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::veteran_profile;
    use super::*;

    fn strict() -> CompetitionRequirements {
        CompetitionRequirements {
            minimum_skill_level: 3,
            minimum_age: 21,
            minimum_competitions: 2,
            region_restricted: true,
            eligible_regions: vec!["pacific".into(), "mountain".into()],
            required_certifications: vec!["organic".into()],
        }
    }

    #[test]
    fn test_qualified_veteran() {
        let result = check_qualification(&veteran_profile(), &strict());
        assert!(result.is_qualified);
        assert_eq!(result.failure_reason, None);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_low_skill_named_first() {
        let mut profile = veteran_profile();
        profile.skill_level = 2;
        profile.age = 18;

        let result = check_qualification(&profile, &strict());
        assert!(!result.is_qualified);
        assert_eq!(
            result.failed_checks,
            vec![QualificationCheck::SkillLevel, QualificationCheck::Age]
        );
        let reason = result.failure_reason.clone().unwrap();
        assert!(reason.contains("Skill level"));

        assert_eq!(
            result.into_result(),
            Err(CompetitionError::QualificationFailed(reason))
        );
    }

    #[test]
    fn test_region_only_checked_when_restricted() {
        let mut profile = veteran_profile();
        profile.region = "atlantic".into();
        assert!(!check_qualification(&profile, &strict()).is_qualified);

        let open = CompetitionRequirements {
            region_restricted: false,
            ..strict()
        };
        assert!(check_qualification(&profile, &open).is_qualified);
    }

    #[test]
    fn test_missing_certifications_listed() {
        let mut req = strict();
        req.required_certifications = vec!["organic".into(), "master-grower".into()];
        let result = check_qualification(&veteran_profile(), &req);
        assert_eq!(
            result.failure_reason.as_deref(),
            Some("Missing required certifications: master-grower")
        );
    }
}
