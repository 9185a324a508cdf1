//! Domain events emitted by competitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::competition::{
    CategoryId, CompetitionId, CompetitorId, EntryId, EntryStatus, JudgeId, PrizeId,
    RegistrationId, SessionId,
};
use crate::config::Placement;
use crate::qualification::RegistrationStatus;

/// Channel an event is published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    CompetitionCreated,
    Registration,
    EntryStatusChanged,
    ScoreSubmitted,
    SessionStarted,
    SessionCompleted,
    ResultsFinalized,
    ResultsValidated,
    PrizeDistributed,
    PrizeClaimed,
    CompetitionClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CompetitionEvent {
    CompetitionCreated {
        competition_id: CompetitionId,
        name: String,
        at: DateTime<Utc>,
    },
    Registration {
        competition_id: CompetitionId,
        registration_id: RegistrationId,
        competitor_id: CompetitorId,
        status: RegistrationStatus,
        at: DateTime<Utc>,
    },
    EntryStatusChanged {
        competition_id: CompetitionId,
        entry_id: EntryId,
        from: EntryStatus,
        to: EntryStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    ScoreSubmitted {
        competition_id: CompetitionId,
        entry_id: EntryId,
        judge_id: JudgeId,
        total_score: f64,
        entry_score: Option<f64>,
        at: DateTime<Utc>,
    },
    SessionStarted {
        competition_id: CompetitionId,
        session_id: SessionId,
        judge_id: JudgeId,
        entries: usize,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        competition_id: CompetitionId,
        session_id: SessionId,
        judge_id: JudgeId,
        at: DateTime<Utc>,
    },
    ResultsFinalized {
        competition_id: CompetitionId,
        ranked_entries: usize,
        winner: Option<CompetitorId>,
        at: DateTime<Utc>,
    },
    ResultsValidated {
        competition_id: CompetitionId,
        at: DateTime<Utc>,
    },
    PrizeDistributed {
        competition_id: CompetitionId,
        prize_id: PrizeId,
        winner: CompetitorId,
        placement: Placement,
        category: Option<CategoryId>,
        at: DateTime<Utc>,
    },
    PrizeClaimed {
        competition_id: CompetitionId,
        prize_id: PrizeId,
        claimant: CompetitorId,
        at: DateTime<Utc>,
    },
    /// Entries are no longer accepted
    CompetitionClosed {
        competition_id: CompetitionId,
        at: DateTime<Utc>,
    },
}

impl CompetitionEvent {
    pub fn topic(&self) -> Topic {
        match self {
            CompetitionEvent::CompetitionCreated { .. } => Topic::CompetitionCreated,
            CompetitionEvent::Registration { .. } => Topic::Registration,
            CompetitionEvent::EntryStatusChanged { .. } => Topic::EntryStatusChanged,
            CompetitionEvent::ScoreSubmitted { .. } => Topic::ScoreSubmitted,
            CompetitionEvent::SessionStarted { .. } => Topic::SessionStarted,
            CompetitionEvent::SessionCompleted { .. } => Topic::SessionCompleted,
            CompetitionEvent::ResultsFinalized { .. } => Topic::ResultsFinalized,
            CompetitionEvent::ResultsValidated { .. } => Topic::ResultsValidated,
            CompetitionEvent::PrizeDistributed { .. } => Topic::PrizeDistributed,
            CompetitionEvent::PrizeClaimed { .. } => Topic::PrizeClaimed,
            CompetitionEvent::CompetitionClosed { .. } => Topic::CompetitionClosed,
        }
    }

    pub fn competition_id(&self) -> &CompetitionId {
        match self {
            CompetitionEvent::CompetitionCreated { competition_id, .. }
            | CompetitionEvent::Registration { competition_id, .. }
            | CompetitionEvent::EntryStatusChanged { competition_id, .. }
            | CompetitionEvent::ScoreSubmitted { competition_id, .. }
            | CompetitionEvent::SessionStarted { competition_id, .. }
            | CompetitionEvent::SessionCompleted { competition_id, .. }
            | CompetitionEvent::ResultsFinalized { competition_id, .. }
            | CompetitionEvent::ResultsValidated { competition_id, .. }
            | CompetitionEvent::PrizeDistributed { competition_id, .. }
            | CompetitionEvent::PrizeClaimed { competition_id, .. }
            | CompetitionEvent::CompetitionClosed { competition_id, .. } => competition_id,
        }
    }
}
