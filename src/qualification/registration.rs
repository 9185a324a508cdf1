//! Participant registrations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{check_qualification, ParticipantProfile, QualificationResult};
use crate::competition::{CategoryId, CompetitionId, EntryId, RegistrationId};
use crate::config::CompetitionRequirements;
use crate::error::{CompetitionError, Result};

/// `Pending -> Validated | ValidationFailed -> Submitted -> Accepted | Rejected | Cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Validated,
    ValidationFailed,
    Submitted,
    Accepted,
    Rejected,
    Cancelled,
}

impl RegistrationStatus {
    /// Whether the registration still blocks the competitor from registering again
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RegistrationStatus::Pending
                | RegistrationStatus::Validated
                | RegistrationStatus::Submitted
                | RegistrationStatus::Accepted
        )
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Validated => "validated",
            RegistrationStatus::ValidationFailed => "validation failed",
            RegistrationStatus::Submitted => "submitted",
            RegistrationStatus::Accepted => "accepted",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRegistration {
    pub id: RegistrationId,
    pub competition_id: CompetitionId,
    pub category_id: CategoryId,
    pub profile: ParticipantProfile,
    status: RegistrationStatus,
    qualification: Option<QualificationResult>,
    entry_id: Option<EntryId>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParticipantRegistration {
    pub fn new(
        competition_id: CompetitionId,
        category_id: CategoryId,
        profile: ParticipantProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RegistrationId::generate(),
            competition_id,
            category_id,
            profile,
            status: RegistrationStatus::Pending,
            qualification: None,
            entry_id: None,
            registered_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn qualification(&self) -> Option<&QualificationResult> {
        self.qualification.as_ref()
    }

    pub fn entry_id(&self) -> Option<&EntryId> {
        self.entry_id.as_ref()
    }

    /// Validation errors, echoed verbatim from the qualification check
    pub fn validation_errors(&self) -> Vec<String> {
        self.qualification
            .as_ref()
            .and_then(|q| q.failure_reason.clone())
            .into_iter()
            .collect()
    }

    /// `Pending -> Validated | ValidationFailed`
    pub fn validate(
        &mut self,
        requirements: &CompetitionRequirements,
        now: DateTime<Utc>,
    ) -> Result<&QualificationResult> {
        self.require(&[RegistrationStatus::Pending], "validate")?;
        let result = check_qualification(&self.profile, requirements);
        self.status = if result.is_qualified {
            RegistrationStatus::Validated
        } else {
            RegistrationStatus::ValidationFailed
        };
        self.updated_at = now;
        Ok(self.qualification.insert(result))
    }

    /// `Validated -> Submitted` once an entry has been created for this registration
    pub fn attach_entry(&mut self, entry: EntryId, now: DateTime<Utc>) -> Result<()> {
        if self.status == RegistrationStatus::ValidationFailed {
            let reason = self
                .qualification
                .as_ref()
                .and_then(|q| q.failure_reason.clone())
                .unwrap_or_else(|| "registration failed validation".to_string());
            return Err(CompetitionError::QualificationFailed(reason));
        }
        self.require(&[RegistrationStatus::Validated], "enter a plant")?;
        self.entry_id = Some(entry);
        self.status = RegistrationStatus::Submitted;
        self.updated_at = now;
        Ok(())
    }

    /// `Submitted -> Accepted`
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require(&[RegistrationStatus::Submitted], "accept")?;
        self.status = RegistrationStatus::Accepted;
        self.updated_at = now;
        Ok(())
    }

    /// `Submitted -> Rejected`
    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.require(&[RegistrationStatus::Submitted], "reject")?;
        self.status = RegistrationStatus::Rejected;
        self.updated_at = now;
        Ok(())
    }

    /// Withdraw before acceptance; returns the draft entry to discard, if any
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<Option<EntryId>> {
        self.require(
            &[
                RegistrationStatus::Pending,
                RegistrationStatus::Validated,
                RegistrationStatus::Submitted,
            ],
            "cancel",
        )?;
        self.status = RegistrationStatus::Cancelled;
        self.updated_at = now;
        Ok(self.entry_id.take())
    }

    fn require(&self, allowed: &[RegistrationStatus], action: &'static str) -> Result<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(CompetitionError::InvalidTransition {
                state: format!("registration {} is {}", self.id, self.status),
                action,
            })
        }
    }
}
