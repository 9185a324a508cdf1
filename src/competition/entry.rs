//! Competition entries and their status machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use super::{CategoryId, CompetitionId, CompetitorId, EntryId, Metadata, RegistrationId};
use crate::config::CompetitionRules;
use crate::error::{CompetitionError, Result};
use crate::judging::JudgeScore;
use crate::scoring::aggregate_scores;
use crate::submission::{EntryDocumentation, PlantSubmission};

/// Where an entry stands in a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Reported for ids no competition knows about
    NotFound,
    Draft,
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Disqualified,
}

impl EntryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EntryStatus::Accepted | EntryStatus::Rejected | EntryStatus::Disqualified
        )
    }

    /// Whether judges may still score the entry
    pub fn is_judgeable(self) -> bool {
        matches!(self, EntryStatus::Submitted | EntryStatus::UnderReview)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryStatus::NotFound => "not found",
            EntryStatus::Draft => "draft",
            EntryStatus::Submitted => "submitted",
            EntryStatus::UnderReview => "under review",
            EntryStatus::Accepted => "accepted",
            EntryStatus::Rejected => "rejected",
            EntryStatus::Disqualified => "disqualified",
        };
        f.write_str(name)
    }
}

/// A competitor's plant entered into one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionEntry {
    pub id: EntryId,
    pub competition_id: CompetitionId,
    pub competitor_id: CompetitorId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub registration_id: Option<RegistrationId>,
    submission: PlantSubmission,
    documentation: EntryDocumentation,
    scores: SmallVec<[JudgeScore; 4]>,
    entry_score: Option<f64>,
    status: EntryStatus,
    pub created_at: DateTime<Utc>,
    submission_date: Option<DateTime<Utc>>,
    disqualification_reason: Option<String>,
    rejection_reason: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl CompetitionEntry {
    pub fn new(
        competition_id: CompetitionId,
        competitor_id: CompetitorId,
        category_id: CategoryId,
        submission: PlantSubmission,
        documentation: EntryDocumentation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            competition_id,
            competitor_id,
            category_id,
            registration_id: None,
            submission,
            documentation,
            scores: SmallVec::new(),
            entry_score: None,
            status: EntryStatus::Draft,
            created_at: now,
            submission_date: None,
            disqualification_reason: None,
            rejection_reason: None,
            metadata: Metadata::default(),
        }
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn submission(&self) -> &PlantSubmission {
        &self.submission
    }

    pub fn documentation(&self) -> &EntryDocumentation {
        &self.documentation
    }

    pub fn scores(&self) -> &[JudgeScore] {
        &self.scores
    }

    /// Mean of all judges' totals; `None` until the first score arrives
    pub fn entry_score(&self) -> Option<f64> {
        self.entry_score
    }

    pub fn submission_date(&self) -> Option<DateTime<Utc>> {
        self.submission_date
    }

    pub fn disqualification_reason(&self) -> Option<&str> {
        self.disqualification_reason.as_deref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Replace the submission and documentation of a draft
    pub fn revise(
        &mut self,
        submission: PlantSubmission,
        documentation: EntryDocumentation,
    ) -> Result<()> {
        self.require(EntryStatus::Draft, "revise the submission")?;
        self.submission = submission;
        self.documentation = documentation;
        Ok(())
    }

    /// `Draft -> Submitted` once the entry meets the rules; stays a draft otherwise
    pub fn submit(&mut self, rules: &CompetitionRules, now: DateTime<Utc>) -> Result<()> {
        self.require(EntryStatus::Draft, "submit")?;
        self.check_eligibility(rules)?;
        self.status = EntryStatus::Submitted;
        self.submission_date = Some(now);
        Ok(())
    }

    fn check_eligibility(&self, rules: &CompetitionRules) -> Result<()> {
        self.submission.validate()?;

        if rules.require_documentation {
            if let Some(missing) = self.documentation.missing_items().first() {
                return Err(CompetitionError::IneligibleSubmission(format!(
                    "documentation incomplete: missing {}",
                    missing
                )));
            }
        }

        if self.submission.plant_age_days < rules.minimum_plant_age {
            return Err(CompetitionError::IneligibleSubmission(format!(
                "plant age {} days is below the minimum of {} days",
                self.submission.plant_age_days, rules.minimum_plant_age
            )));
        }

        if self.submission.yield_grams < rules.minimum_yield {
            return Err(CompetitionError::IneligibleSubmission(format!(
                "yield {:.1}g is below the minimum of {:.1}g",
                self.submission.yield_grams, rules.minimum_yield
            )));
        }

        Ok(())
    }

    /// Attach a judge's score; the first score moves the entry under review
    pub fn record_score(&mut self, score: JudgeScore) -> Result<()> {
        if !self.status.is_judgeable() {
            return Err(self.invalid("record a score"));
        }
        if self.scores.iter().any(|s| s.judge_id == score.judge_id) {
            return Err(CompetitionError::DuplicateScore {
                judge: score.judge_id,
                entry: self.id.clone(),
            });
        }

        self.scores.push(score);
        self.entry_score = aggregate_scores(&self.scores);
        self.status = EntryStatus::UnderReview;
        Ok(())
    }

    /// Any non-terminal entry can be disqualified with a reason
    pub fn disqualify(&mut self, reason: impl Into<String>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(self.invalid("disqualify"));
        }
        self.status = EntryStatus::Disqualified;
        self.disqualification_reason = Some(reason.into());
        Ok(())
    }

    /// Settle an entry under review at finalization.
    ///
    /// Returns the new status, or `None` when the entry was not under review and is left as
    /// it was.
    pub fn resolve(&mut self, rules: &CompetitionRules) -> Result<Option<EntryStatus>> {
        if self.status != EntryStatus::UnderReview {
            return Ok(None);
        }

        match rules.disqualification_for(&self.submission)? {
            Some(reason) => {
                self.rejection_reason = Some(reason.to_string());
                self.status = EntryStatus::Rejected;
            }
            None => self.status = EntryStatus::Accepted,
        }
        Ok(Some(self.status))
    }

    fn require(&self, expected: EntryStatus, action: &'static str) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> CompetitionError {
        CompetitionError::InvalidTransition {
            state: format!("entry {} is {}", self.id, self.status),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::{JudgeId, SessionId};
    use crate::config::{DisqualificationCriterion, JudgingCriteria};
    use crate::judging::ScoreBreakdown;
    use crate::submission::test_support::{complete_documentation, sample_submission};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 5, 12, 0, 0).unwrap()
    }

    fn rules() -> CompetitionRules {
        CompetitionRules {
            minimum_plant_age: 60,
            minimum_yield: 10.0,
            ..Default::default()
        }
    }

    fn draft() -> CompetitionEntry {
        CompetitionEntry::new(
            CompetitionId::new("c"),
            CompetitorId::new("grower"),
            CategoryId::new("indica"),
            sample_submission(),
            complete_documentation(),
            now(),
        )
    }

    fn score(judge: &str, entry: &CompetitionEntry, raw: [f64; 4]) -> JudgeScore {
        JudgeScore::new(
            JudgeId::new(judge),
            entry.id.clone(),
            SessionId::new("s"),
            ScoreBreakdown::new(raw[0], raw[1], raw[2], raw[3]).unwrap(),
            &JudgingCriteria::default(),
            "",
            now(),
        )
    }

    #[test]
    fn test_young_plant_stays_draft() {
        let mut entry = draft();
        let mut submission = sample_submission();
        submission.plant_age_days = 45;
        entry.revise(submission, complete_documentation()).unwrap();

        let err = entry.submit(&rules(), now()).unwrap_err();
        assert!(matches!(err, CompetitionError::IneligibleSubmission(ref m) if m.contains("45")));
        assert_eq!(entry.status(), EntryStatus::Draft);
        assert!(entry.submission_date().is_none());
    }

    #[test]
    fn test_documentation_checked_before_age() {
        let mut entry = draft();
        let mut submission = sample_submission();
        submission.plant_age_days = 10;
        entry
            .revise(submission, EntryDocumentation::default())
            .unwrap();

        match entry.submit(&rules(), now()) {
            Err(CompetitionError::IneligibleSubmission(reason)) => {
                assert_eq!(reason, "documentation incomplete: missing grow journal")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_low_yield_rejected() {
        let mut entry = draft();
        let mut submission = sample_submission();
        submission.yield_grams = 4.0;
        entry.revise(submission, complete_documentation()).unwrap();
        assert!(entry.submit(&rules(), now()).is_err());
    }

    #[test]
    fn test_submission_frozen_after_submit() {
        let mut entry = draft();
        entry.submit(&rules(), now()).unwrap();
        assert_eq!(entry.status(), EntryStatus::Submitted);
        assert_eq!(entry.submission_date(), Some(now()));
        assert!(matches!(
            entry.revise(sample_submission(), complete_documentation()),
            Err(CompetitionError::InvalidTransition { .. })
        ));
        assert!(entry.submit(&rules(), now()).is_err());
    }

    #[test]
    fn test_scores_average_and_move_under_review() {
        let mut entry = draft();
        assert!(entry.record_score(score("j1", &entry, [50.0; 4])).is_err());

        entry.submit(&rules(), now()).unwrap();
        assert_eq!(entry.entry_score(), None);

        entry
            .record_score(score("j1", &entry, [80.0, 70.0, 90.0, 85.0]))
            .unwrap();
        assert_eq!(entry.status(), EntryStatus::UnderReview);
        entry.record_score(score("j2", &entry, [60.0; 4])).unwrap();

        let mean = entry.entry_score().unwrap();
        assert!((mean - (81.5 + 60.0) / 2.0).abs() < 1e-9);

        assert!(matches!(
            entry.record_score(score("j1", &entry, [10.0; 4])),
            Err(CompetitionError::DuplicateScore { .. })
        ));
        assert_eq!(entry.scores().len(), 2);
    }

    #[test]
    fn test_resolve_applies_criteria() {
        let mut rules = rules();
        rules.disqualification_criteria.push(DisqualificationCriterion {
            reason: "Implausible potency".into(),
            condition: "THC>35".into(),
        });

        let mut clean = draft();
        clean.submit(&rules, now()).unwrap();
        clean.record_score(score("j1", &clean, [70.0; 4])).unwrap();
        assert_eq!(clean.resolve(&rules).unwrap(), Some(EntryStatus::Accepted));

        let mut hot = draft();
        let mut submission = sample_submission();
        submission.cannabinoids.thc = 38.0;
        hot.revise(submission, complete_documentation()).unwrap();
        hot.submit(&rules, now()).unwrap();
        hot.record_score(score("j1", &hot, [70.0; 4])).unwrap();
        assert_eq!(hot.resolve(&rules).unwrap(), Some(EntryStatus::Rejected));
        assert_eq!(hot.rejection_reason(), Some("Implausible potency"));

        // terminal entries are left alone
        assert_eq!(hot.resolve(&rules).unwrap(), None);
    }

    #[test]
    fn test_disqualify_until_terminal() {
        let mut entry = draft();
        entry.disqualify("Late paperwork").unwrap();
        assert_eq!(entry.status(), EntryStatus::Disqualified);
        assert_eq!(entry.disqualification_reason(), Some("Late paperwork"));
        assert!(entry.disqualify("again").is_err());
    }
}
