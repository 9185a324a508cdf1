//! Property tests for qualification

use proptest::prelude::*;

use crate::competition::CompetitorId;
use crate::config::CompetitionRequirements;
use crate::qualification::{check_qualification, ParticipantProfile, QualificationCheck};

const REGIONS: [&str; 4] = ["pacific", "mountain", "atlantic", "gulf"];
const CERTIFICATIONS: [&str; 4] = ["organic", "lab-tested", "master-grower", "hydro"];

fn subset(pool: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(pool.to_vec(), 0..=pool.len())
        .prop_map(|items| items.into_iter().map(String::from).collect())
}

fn profile_strategy() -> impl Strategy<Value = ParticipantProfile> {
    (
        0..10u32,
        14..60u32,
        0..6u32,
        prop::sample::select(REGIONS.to_vec()),
        subset(&CERTIFICATIONS),
    )
        .prop_map(|(skill, age, history, region, certifications)| ParticipantProfile {
            competitor_id: CompetitorId::new("prop-grower"),
            display_name: "Prop".into(),
            skill_level: skill,
            age,
            competitions_entered: history,
            region: region.to_string(),
            certifications,
        })
}

fn requirements_strategy() -> impl Strategy<Value = CompetitionRequirements> {
    (
        0..10u32,
        14..60u32,
        0..6u32,
        any::<bool>(),
        subset(&REGIONS),
        subset(&CERTIFICATIONS),
    )
        .prop_map(
            |(skill, age, history, restricted, regions, certifications)| CompetitionRequirements {
                minimum_skill_level: skill,
                minimum_age: age,
                minimum_competitions: history,
                region_restricted: restricted,
                eligible_regions: regions,
                required_certifications: certifications,
            },
        )
}

proptest! {
    /// Qualified exactly when all five checks hold
    #[test]
    fn prop_qualified_iff_all_checks_pass(
        profile in profile_strategy(),
        req in requirements_strategy()
    ) {
        let expected = profile.skill_level >= req.minimum_skill_level
            && profile.age >= req.minimum_age
            && profile.competitions_entered >= req.minimum_competitions
            && (!req.region_restricted || req.eligible_regions.contains(&profile.region))
            && req
                .required_certifications
                .iter()
                .all(|c| profile.certifications.contains(c));

        let result = check_qualification(&profile, &req);
        prop_assert_eq!(result.is_qualified, expected);
        prop_assert_eq!(result.failure_reason.is_none(), expected);
        prop_assert_eq!(result.failed_checks.is_empty(), expected);
    }

    /// The reason always belongs to the first failed check
    #[test]
    fn prop_reason_names_first_failure(
        profile in profile_strategy(),
        req in requirements_strategy()
    ) {
        let result = check_qualification(&profile, &req);
        if let (Some(first), Some(reason)) = (result.failed_checks.first(), &result.failure_reason) {
            let marker = match first {
                QualificationCheck::SkillLevel => "Skill level",
                QualificationCheck::Age => "Age",
                QualificationCheck::CompetitionHistory => "previous competitions",
                QualificationCheck::Region => "Region",
                QualificationCheck::Certifications => "certifications",
            };
            prop_assert!(reason.contains(marker), "{} vs {:?}", reason, first);
        }
    }

    /// Checking is pure: the same inputs give the same result
    #[test]
    fn prop_check_is_deterministic(
        profile in profile_strategy(),
        req in requirements_strategy()
    ) {
        prop_assert_eq!(check_qualification(&profile, &req), check_qualification(&profile, &req));
    }
}

#[test]
fn test_skill_below_minimum_names_skill_level() {
    let profile = ParticipantProfile {
        competitor_id: CompetitorId::new("novice"),
        display_name: "Novice".into(),
        skill_level: 2,
        age: 25,
        competitions_entered: 0,
        region: String::new(),
        certifications: vec![],
    };
    let req = CompetitionRequirements {
        minimum_skill_level: 3,
        ..Default::default()
    };

    let result = check_qualification(&profile, &req);
    assert!(!result.is_qualified);
    assert!(result.failure_reason.unwrap().to_lowercase().contains("skill level"));
}
