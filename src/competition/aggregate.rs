//! The competition aggregate
//!
//! A `Competition` owns its categories, registrations, entries, judging sessions, results
//! and awarded prizes. Every mutation goes through a method here, and every method either
//! succeeds completely or leaves the aggregate untouched. Events describing successful
//! mutations are buffered and handed out by [`Competition::take_events`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    CategoryId, CompetitionEntry, CompetitionId, CompetitorId, EntryId, EntryStatus, JudgeId,
    Metadata, PrizeId, RegistrationId, SessionId,
};
use crate::config::{
    CompetitionConfig, CompetitionRequirements, CompetitionRewards, CompetitionRules,
    CompetitionType, JudgingCriteria,
};
use crate::error::{CompetitionError, Result};
use crate::events::CompetitionEvent;
use crate::judging::{JudgeScore, JudgeSlot, JudgingSession, ScoreBreakdown, SessionRecord};
use crate::qualification::{ParticipantProfile, ParticipantRegistration, RegistrationStatus};
use crate::rewards::{distribute_prizes, DistributedPrize};
use crate::scoring::CompetitionResults;
use crate::submission::{EntryDocumentation, PlantSubmission};

/// Coarse lifecycle stage, derived from the schedule and the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionPhase {
    /// Before `start_date`
    Upcoming,
    /// Accepting registrations and entries
    Open,
    /// Entries closed, judges still scoring
    Judging,
    /// Results computed
    Finalized,
    /// Prizes distributed
    Concluded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub max_entries: u32,
}

#[derive(Debug)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub description: String,
    pub competition_type: CompetitionType,
    pub start_date: DateTime<Utc>,
    pub judging_deadline: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub categories: Vec<CompetitionCategory>,
    pub rules: CompetitionRules,
    pub requirements: CompetitionRequirements,
    pub criteria: JudgingCriteria,
    pub rewards: CompetitionRewards,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    accepting_entries: bool,
    registrations: Vec<ParticipantRegistration>,
    entries: Vec<CompetitionEntry>,
    sessions: BTreeMap<SessionId, SessionRecord>,
    results: Option<CompetitionResults>,
    prizes: Vec<DistributedPrize>,
    prizes_distributed: bool,
    pending_events: Vec<CompetitionEvent>,
}

impl Competition {
    /// Build a competition from a validated definition
    pub fn from_config(config: CompetitionConfig, now: DateTime<Utc>) -> Result<Self> {
        config.validate()?;

        let id = config.id.unwrap_or_else(CompetitionId::generate);
        let categories = config
            .categories
            .into_iter()
            .map(|c| CompetitionCategory {
                id: c.id.unwrap_or_else(CategoryId::generate),
                name: c.name,
                description: c.description,
                max_entries: c.max_entries,
            })
            .collect();

        let mut competition = Self {
            id: id.clone(),
            name: config.name,
            description: config.description,
            competition_type: config.competition_type,
            start_date: config.start_date,
            judging_deadline: config.judging_deadline,
            end_date: config.end_date,
            categories,
            rules: config.rules,
            requirements: config.requirements,
            criteria: config.criteria,
            rewards: config.rewards,
            metadata: config.metadata,
            created_at: now,
            accepting_entries: true,
            registrations: Vec::new(),
            entries: Vec::new(),
            sessions: BTreeMap::new(),
            results: None,
            prizes: Vec::new(),
            prizes_distributed: false,
            pending_events: Vec::new(),
        };
        competition.emit(CompetitionEvent::CompetitionCreated {
            competition_id: id,
            name: competition.name.clone(),
            at: now,
        });
        Ok(competition)
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub fn phase(&self, now: DateTime<Utc>) -> CompetitionPhase {
        if self.prizes_distributed {
            CompetitionPhase::Concluded
        } else if self.results.is_some() {
            CompetitionPhase::Finalized
        } else if now < self.start_date {
            CompetitionPhase::Upcoming
        } else if self.is_accepting_entries(now) {
            CompetitionPhase::Open
        } else {
            CompetitionPhase::Judging
        }
    }

    /// Entries are taken from `start_date` until `judging_deadline`, unless closed early
    pub fn is_accepting_entries(&self, now: DateTime<Utc>) -> bool {
        self.accepting_entries && self.start_date <= now && now < self.judging_deadline
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CompetitionCategory> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Entries currently held by a category
    pub fn category_fill(&self, id: &CategoryId) -> usize {
        self.entries.iter().filter(|e| &e.category_id == id).count()
    }

    pub fn entries(&self) -> &[CompetitionEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &EntryId) -> Option<&CompetitionEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn registrations(&self) -> &[ParticipantRegistration] {
        &self.registrations
    }

    pub fn registration(&self, id: &RegistrationId) -> Option<&ParticipantRegistration> {
        self.registrations.iter().find(|r| &r.id == id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &JudgingSession> {
        self.sessions.values().map(|r| &r.session)
    }

    pub fn session(&self, id: &SessionId) -> Option<&JudgingSession> {
        self.sessions.get(id).map(|r| &r.session)
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.values().filter(|r| r.holds_capacity()).count()
    }

    pub fn results(&self) -> Option<&CompetitionResults> {
        self.results.as_ref()
    }

    pub fn prizes(&self) -> &[DistributedPrize] {
        &self.prizes
    }

    pub fn prizes_distributed(&self) -> bool {
        self.prizes_distributed
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<CompetitionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ============================================================================
    // Registration
    // ============================================================================

    /// Register a competitor for a category; the registration is validated right away
    pub fn register_participant(
        &mut self,
        profile: ParticipantProfile,
        category_id: &CategoryId,
        now: DateTime<Utc>,
    ) -> Result<ParticipantRegistration> {
        self.ensure_open(now)?;
        if self.category(category_id).is_none() {
            return Err(CompetitionError::CategoryNotFound(category_id.clone()));
        }

        let duplicate = self
            .registrations
            .iter()
            .any(|r| r.profile.competitor_id == profile.competitor_id && r.status().is_active());
        if duplicate {
            return Err(CompetitionError::DuplicateRegistration {
                competitor: profile.competitor_id,
                competition: self.id.clone(),
            });
        }

        let mut registration =
            ParticipantRegistration::new(self.id.clone(), category_id.clone(), profile, now);
        registration.validate(&self.requirements, now)?;

        self.emit_registration(&registration, now);
        self.registrations.push(registration.clone());
        Ok(registration)
    }

    /// Create a draft entry for a validated registration
    pub fn register_entry(
        &mut self,
        registration_id: &RegistrationId,
        submission: PlantSubmission,
        documentation: EntryDocumentation,
        now: DateTime<Utc>,
    ) -> Result<EntryId> {
        self.ensure_open(now)?;

        let index = self.registration_index(registration_id)?;
        let category_id = self.registrations[index].category_id.clone();
        let competitor_id = self.registrations[index].profile.competitor_id.clone();

        let capacity = self
            .category(&category_id)
            .map(|c| c.max_entries as usize)
            .ok_or_else(|| CompetitionError::CategoryNotFound(category_id.clone()))?;
        if self.category_fill(&category_id) >= capacity {
            return Err(CompetitionError::CategoryFull(category_id));
        }

        let mut entry = CompetitionEntry::new(
            self.id.clone(),
            competitor_id,
            category_id,
            submission,
            documentation,
            now,
        );
        entry.registration_id = Some(registration_id.clone());
        self.registrations[index].attach_entry(entry.id.clone(), now)?;

        let entry_id = entry.id.clone();
        let registration = self.registrations[index].clone();
        self.entries.push(entry);
        self.emit_registration(&registration, now);
        self.emit_status(&entry_id, EntryStatus::NotFound, EntryStatus::Draft, None, now);
        Ok(entry_id)
    }

    /// Replace the submission of a draft entry
    pub fn revise_entry(
        &mut self,
        entry_id: &EntryId,
        submission: PlantSubmission,
        documentation: EntryDocumentation,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_open(now)?;
        find_entry_mut(&mut self.entries, entry_id)?.revise(submission, documentation)
    }

    /// `Draft -> Submitted`; the registration is accepted with it
    pub fn submit_entry(&mut self, entry_id: &EntryId, now: DateTime<Utc>) -> Result<()> {
        self.ensure_open(now)?;

        let entry = find_entry_mut(&mut self.entries, entry_id)?;
        entry.submit(&self.rules, now)?;
        let registration_id = entry.registration_id.clone();

        if let Some(registration_id) = registration_id {
            let index = self.registration_index(&registration_id)?;
            self.registrations[index].accept(now)?;
            let registration = self.registrations[index].clone();
            self.emit_registration(&registration, now);
        }
        self.emit_status(entry_id, EntryStatus::Draft, EntryStatus::Submitted, None, now);
        Ok(())
    }

    /// Withdraw a registration that has not been accepted; its draft entry is discarded
    pub fn cancel_registration(
        &mut self,
        registration_id: &RegistrationId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let index = self.registration_index(registration_id)?;
        let discarded = self.registrations[index].cancel(now)?;

        if let Some(entry_id) = discarded {
            self.entries.retain(|e| e.id != entry_id);
            self.emit_status(&entry_id, EntryStatus::Draft, EntryStatus::NotFound, None, now);
        }
        let registration = self.registrations[index].clone();
        self.emit_registration(&registration, now);
        Ok(())
    }

    /// Stop taking entries ahead of the deadline; idempotent
    pub fn close_entries(&mut self, now: DateTime<Utc>) {
        if self.accepting_entries {
            self.accepting_entries = false;
            self.emit(CompetitionEvent::CompetitionClosed {
                competition_id: self.id.clone(),
                at: now,
            });
        }
    }

    // ============================================================================
    // Judging
    // ============================================================================

    /// Open a session for `judge` over `entry_ids`, occupying one of the judge's slots
    pub fn start_session(
        &mut self,
        judge: &Arc<JudgeSlot>,
        entry_ids: Vec<EntryId>,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<JudgingSession> {
        self.ensure_not_finalized()?;
        if now >= self.end_date {
            return Err(CompetitionError::InvalidTransition {
                state: format!("competition {} no longer accepts scores", self.id),
                action: "start a judging session",
            });
        }

        let mut entry_ids = entry_ids;
        entry_ids.sort();
        entry_ids.dedup();
        if entry_ids.is_empty() {
            return Err(CompetitionError::InvalidTransition {
                state: "no entries were selected".to_string(),
                action: "start a judging session",
            });
        }
        for id in &entry_ids {
            let entry = self
                .entry(id)
                .ok_or_else(|| CompetitionError::EntryNotFound(id.clone()))?;
            if !entry.status().is_judgeable() {
                return Err(CompetitionError::InvalidTransition {
                    state: format!("entry {} is {}", id, entry.status()),
                    action: "start a judging session",
                });
            }
        }

        let lease = judge.try_acquire()?;
        let ends_at = now
            .checked_add_signed(duration)
            .map_or(self.end_date, |end| end.min(self.end_date));
        let session = JudgingSession::new(
            self.id.clone(),
            judge.id().clone(),
            entry_ids,
            now,
            ends_at,
        );

        self.emit(CompetitionEvent::SessionStarted {
            competition_id: self.id.clone(),
            session_id: session.id.clone(),
            judge_id: session.judge_id.clone(),
            entries: session.entry_ids.len(),
            at: now,
        });
        self.sessions
            .insert(session.id.clone(), SessionRecord::new(session.clone(), lease));
        Ok(session)
    }

    /// Record one judge's score for one entry within a session
    pub fn submit_score(
        &mut self,
        session_id: &SessionId,
        judge_id: &JudgeId,
        entry_id: &EntryId,
        breakdown: ScoreBreakdown,
        comments: &str,
        now: DateTime<Utc>,
    ) -> Result<JudgeScore> {
        self.ensure_not_finalized()?;
        breakdown.validate()?;

        let record = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CompetitionError::SessionNotFound(session_id.clone()))?;
        if &record.session.judge_id != judge_id {
            return Err(CompetitionError::NotSessionJudge {
                session: session_id.clone(),
                judge: judge_id.clone(),
            });
        }
        record.session.ensure_accepts(entry_id, now)?;

        let entry = find_entry_mut(&mut self.entries, entry_id)?;
        let before = entry.status();
        let score = JudgeScore::new(
            judge_id.clone(),
            entry_id.clone(),
            session_id.clone(),
            breakdown,
            &self.criteria,
            comments,
            now,
        );
        entry.record_score(score.clone())?;
        let after = entry.status();
        let entry_score = entry.entry_score();
        record.session.mark_scored(entry_id.clone());

        self.emit(CompetitionEvent::ScoreSubmitted {
            competition_id: self.id.clone(),
            entry_id: entry_id.clone(),
            judge_id: judge_id.clone(),
            total_score: score.total_score,
            entry_score,
            at: now,
        });
        if before != after {
            self.emit_status(entry_id, before, after, None, now);
        }
        Ok(score)
    }

    /// Close a session and release the judge's slot
    pub fn complete_session(
        &mut self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<JudgingSession> {
        let record = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CompetitionError::SessionNotFound(session_id.clone()))?;
        record.close(now)?;
        let session = record.session.clone();

        self.emit(CompetitionEvent::SessionCompleted {
            competition_id: self.id.clone(),
            session_id: session.id.clone(),
            judge_id: session.judge_id.clone(),
            at: now,
        });
        Ok(session)
    }

    /// Close every session whose window has passed; returns how many were closed
    pub fn expire_sessions(&mut self, now: DateTime<Utc>) -> usize {
        self.close_sessions_where(now, |s| s.is_expired(now))
    }

    /// Close every open session regardless of its window
    pub fn close_all_sessions(&mut self, now: DateTime<Utc>) -> usize {
        self.close_sessions_where(now, |s| !s.is_completed)
    }

    fn close_sessions_where(
        &mut self,
        now: DateTime<Utc>,
        should_close: impl Fn(&JudgingSession) -> bool,
    ) -> usize {
        let ids: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|r| should_close(&r.session))
            .map(|r| r.session.id.clone())
            .collect();

        for id in &ids {
            // only sessions that are still open were selected
            let _ = self.complete_session(id, now);
        }
        ids.len()
    }

    /// Disqualify a non-terminal entry up to finalization
    pub fn disqualify_entry(
        &mut self,
        entry_id: &EntryId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_not_finalized()?;

        let entry = find_entry_mut(&mut self.entries, entry_id)?;
        let before = entry.status();
        entry.disqualify(reason)?;
        let registration_id = entry.registration_id.clone();

        if let Some(registration_id) = registration_id {
            let index = self.registration_index(&registration_id)?;
            if self.registrations[index].status() == RegistrationStatus::Submitted {
                self.registrations[index].reject(now)?;
                let registration = self.registrations[index].clone();
                self.emit_registration(&registration, now);
            }
        }
        self.emit_status(
            entry_id,
            before,
            EntryStatus::Disqualified,
            Some(reason.to_string()),
            now,
        );
        Ok(())
    }

    // ============================================================================
    // Results
    // ============================================================================

    /// One-time transition: close entries and sessions, settle entries under review and
    /// rank the accepted ones
    pub fn finalize_results(&mut self, now: DateTime<Utc>) -> Result<&CompetitionResults> {
        self.ensure_not_finalized()?;
        // conditions are cached after the first parse; this cannot fail halfway below
        self.rules.validate()?;

        self.close_entries(now);
        self.close_all_sessions(now);

        let mut changes = Vec::new();
        for entry in &mut self.entries {
            if let Some(status) = entry.resolve(&self.rules)? {
                changes.push((
                    entry.id.clone(),
                    status,
                    entry.rejection_reason().map(str::to_string),
                ));
            }
        }
        for (entry_id, status, reason) in changes {
            self.emit_status(&entry_id, EntryStatus::UnderReview, status, reason, now);
        }

        let stale: Vec<usize> = self
            .registrations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status() == RegistrationStatus::Submitted)
            .map(|(i, _)| i)
            .collect();
        for index in stale {
            self.registrations[index].reject(now)?;
            let registration = self.registrations[index].clone();
            self.emit_registration(&registration, now);
        }

        let results = CompetitionResults::compute(self.id.clone(), &self.entries, now);
        tracing::debug!(
            competition = %self.id,
            ranked = results.rankings.len(),
            entries = results.total_entries,
            "results computed"
        );
        self.emit(CompetitionEvent::ResultsFinalized {
            competition_id: self.id.clone(),
            ranked_entries: results.rankings.len(),
            winner: results.overall_winner.as_ref().map(|w| w.competitor_id.clone()),
            at: now,
        });
        Ok(self.results.insert(results))
    }

    /// Check finalized results against the entries and mark them validated
    pub fn validate_results(&mut self, now: DateTime<Utc>) -> Result<&CompetitionResults> {
        let results = self
            .results
            .as_mut()
            .ok_or_else(|| CompetitionError::ResultsNotFinalized(self.id.clone()))?;

        if !results.is_validated {
            let problems = results.problems(&self.entries);
            if !problems.is_empty() {
                return Err(CompetitionError::InvalidResults(problems.join("; ")));
            }
            results.mark_validated(now);
            self.pending_events.push(CompetitionEvent::ResultsValidated {
                competition_id: self.id.clone(),
                at: now,
            });
        }

        self.results
            .as_ref()
            .ok_or_else(|| CompetitionError::ResultsNotFinalized(self.id.clone()))
    }

    // ============================================================================
    // Rewards
    // ============================================================================

    /// Award prizes from validated results; happens once per competition
    pub fn distribute_prizes(&mut self, now: DateTime<Utc>) -> Result<&[DistributedPrize]> {
        if self.prizes_distributed {
            return Err(CompetitionError::PrizesAlreadyDistributed(self.id.clone()));
        }
        let awards = distribute_prizes(&self.rewards, self.results.as_ref(), &self.id, now)?;

        for award in &awards {
            self.pending_events.push(CompetitionEvent::PrizeDistributed {
                competition_id: self.id.clone(),
                prize_id: award.id.clone(),
                winner: award.winner.clone(),
                placement: award.placement,
                category: award.category.clone(),
                at: now,
            });
        }
        self.prizes = awards;
        self.prizes_distributed = true;
        Ok(&self.prizes)
    }

    pub fn claim_prize(
        &mut self,
        prize_id: &PrizeId,
        claimant: &CompetitorId,
        now: DateTime<Utc>,
    ) -> Result<DistributedPrize> {
        let prize = self
            .prizes
            .iter_mut()
            .find(|p| &p.id == prize_id)
            .ok_or_else(|| CompetitionError::PrizeNotFound(prize_id.clone()))?;
        prize.claim(claimant, now)?;
        let claimed = prize.clone();

        self.emit(CompetitionEvent::PrizeClaimed {
            competition_id: self.id.clone(),
            prize_id: prize_id.clone(),
            claimant: claimant.clone(),
            at: now,
        });
        Ok(claimed)
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    fn ensure_open(&self, now: DateTime<Utc>) -> Result<()> {
        if self.results.is_none() && self.is_accepting_entries(now) {
            Ok(())
        } else {
            Err(CompetitionError::EntriesClosed(self.id.clone()))
        }
    }

    fn ensure_not_finalized(&self) -> Result<()> {
        match self.results {
            Some(_) => Err(CompetitionError::AlreadyFinalized(self.id.clone())),
            None => Ok(()),
        }
    }

    fn registration_index(&self, id: &RegistrationId) -> Result<usize> {
        self.registrations
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| CompetitionError::RegistrationNotFound(id.clone()))
    }

    fn emit(&mut self, event: CompetitionEvent) {
        self.pending_events.push(event);
    }

    fn emit_registration(&mut self, registration: &ParticipantRegistration, now: DateTime<Utc>) {
        self.emit(CompetitionEvent::Registration {
            competition_id: self.id.clone(),
            registration_id: registration.id.clone(),
            competitor_id: registration.profile.competitor_id.clone(),
            status: registration.status(),
            at: now,
        });
    }

    fn emit_status(
        &mut self,
        entry_id: &EntryId,
        from: EntryStatus,
        to: EntryStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.emit(CompetitionEvent::EntryStatusChanged {
            competition_id: self.id.clone(),
            entry_id: entry_id.clone(),
            from,
            to,
            reason,
            at: now,
        });
    }
}

fn find_entry_mut<'a>(
    entries: &'a mut [CompetitionEntry],
    id: &EntryId,
) -> Result<&'a mut CompetitionEntry> {
    entries
        .iter_mut()
        .find(|e| &e.id == id)
        .ok_or_else(|| CompetitionError::EntryNotFound(id.clone()))
}
