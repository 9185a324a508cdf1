//! Judging sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::competition::{CompetitionId, EntryId, JudgeId, SessionId};
use crate::error::{CompetitionError, Result};
use crate::judging::JudgeLease;

/// One judge reviewing a fixed list of entries for a bounded time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgingSession {
    pub id: SessionId,
    pub competition_id: CompetitionId,
    pub judge_id: JudgeId,
    pub entry_ids: Vec<EntryId>,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Entries already scored in this session
    #[serde(default)]
    pub scored: Vec<EntryId>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JudgingSession {
    pub fn new(
        competition_id: CompetitionId,
        judge_id: JudgeId,
        entry_ids: Vec<EntryId>,
        started_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            competition_id,
            judge_id,
            entry_ids,
            started_at,
            ends_at,
            scored: Vec::new(),
            is_completed: false,
            completed_at: None,
        }
    }

    pub fn contains(&self, entry: &EntryId) -> bool {
        self.entry_ids.contains(entry)
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && now < self.ends_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && now >= self.ends_at
    }

    pub fn remaining(&self) -> usize {
        self.entry_ids.len() - self.scored.len()
    }

    /// Check that a score for `entry` may be recorded right now
    pub fn ensure_accepts(&self, entry: &EntryId, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active(now) {
            return Err(CompetitionError::SessionClosed(self.id.clone()));
        }
        if !self.contains(entry) {
            return Err(CompetitionError::EntryNotInSession {
                session: self.id.clone(),
                entry: entry.clone(),
            });
        }
        Ok(())
    }

    pub fn mark_scored(&mut self, entry: EntryId) {
        if !self.scored.contains(&entry) {
            self.scored.push(entry);
        }
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_completed {
            return Err(CompetitionError::SessionClosed(self.id.clone()));
        }
        self.is_completed = true;
        self.completed_at = Some(now);
        Ok(())
    }
}

/// A session plus the judge capacity it occupies while open
#[derive(Debug)]
pub struct SessionRecord {
    pub session: JudgingSession,
    pub(crate) lease: Option<JudgeLease>,
}

impl SessionRecord {
    pub fn new(session: JudgingSession, lease: JudgeLease) -> Self {
        Self {
            session,
            lease: Some(lease),
        }
    }

    /// Complete the session and give the judge's slot back
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.session.complete(now)?;
        self.lease = None;
        Ok(())
    }

    pub fn holds_capacity(&self) -> bool {
        self.lease.is_some()
    }
}
