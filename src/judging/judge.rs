//! Judges and their concurrent-session capacity

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::competition::JudgeId;
use crate::config::CompetitionType;
use crate::error::{CompetitionError, Result};

/// A rater shared by many competitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
    /// Competition types this judge is known for
    #[serde(default)]
    pub specialties: Vec<CompetitionType>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_competitions: u32,
    /// 0.0 (unreliable) to 1.0 (fully trusted)
    #[serde(default = "default_reliability")]
    pub reliability_score: f64,
    #[serde(default)]
    pub certified: bool,
}

fn default_max_concurrent() -> u32 {
    3
}

fn default_reliability() -> f64 {
    1.0
}

impl Judge {
    pub fn new(id: impl Into<JudgeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialties: Vec::new(),
            max_concurrent_competitions: default_max_concurrent(),
            reliability_score: default_reliability(),
            certified: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CompetitionError::InvalidConfig(format!(
                "judge {} has no name",
                self.id
            )));
        }
        if self.max_concurrent_competitions == 0 {
            return Err(CompetitionError::InvalidConfig(format!(
                "judge {} must allow at least one concurrent session",
                self.id
            )));
        }
        if !(0.0..=1.0).contains(&self.reliability_score) {
            return Err(CompetitionError::InvalidConfig(format!(
                "judge {} reliability must be between 0 and 1",
                self.id
            )));
        }
        Ok(())
    }

    pub fn specializes_in(&self, competition_type: CompetitionType) -> bool {
        self.specialties.contains(&competition_type)
    }
}

/// A judge together with the number of sessions they are currently running
#[derive(Debug)]
pub struct JudgeSlot {
    judge: Judge,
    active: AtomicU32,
}

impl JudgeSlot {
    pub fn new(judge: Judge) -> Arc<Self> {
        Arc::new(Self {
            judge,
            active: AtomicU32::new(0),
        })
    }

    pub fn judge(&self) -> &Judge {
        &self.judge
    }

    pub fn id(&self) -> &JudgeId {
        &self.judge.id
    }

    pub fn active_sessions(&self) -> u32 {
        self.active.load(Ordering::Acquire)
    }

    pub fn free_capacity(&self) -> u32 {
        self.judge
            .max_concurrent_competitions
            .saturating_sub(self.active_sessions())
    }

    /// Reserve one session slot; the slot is released when the lease drops
    pub fn try_acquire(self: &Arc<Self>) -> Result<JudgeLease> {
        let max = self.judge.max_concurrent_competitions;
        let mut current = self.active.load(Ordering::Acquire);
        loop {
            if current >= max {
                return Err(CompetitionError::JudgeAtCapacity {
                    judge: self.judge.id.clone(),
                    max,
                });
            }
            match self.active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Ok(JudgeLease {
                        slot: Arc::clone(self),
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }
}

/// One occupied session slot of a judge
#[derive(Debug)]
pub struct JudgeLease {
    slot: Arc<JudgeSlot>,
}

impl Drop for JudgeLease {
    fn drop(&mut self) {
        self.slot.active.fetch_sub(1, Ordering::AcqRel);
    }
}
