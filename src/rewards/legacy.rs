//! Hall of fame: winner profiles and historical records

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::DistributedPrize;
use crate::competition::{CompetitionId, CompetitorId, EntryId};
use crate::config::{CompetitionType, Placement, PrizeKind};
use crate::scoring::CompetitionResults;

/// Lifetime achievements of one competitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinnerProfile {
    pub competitor_id: Option<CompetitorId>,
    pub wins: u32,
    pub podiums: u32,
    pub honorable_mentions: u32,
    pub titles: Vec<String>,
    pub total_currency: u64,
    pub last_win: Option<DateTime<Utc>>,
}

/// Summary of one concluded competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub competition_id: CompetitionId,
    pub competition_name: String,
    pub competition_type: CompetitionType,
    pub concluded_at: DateTime<Utc>,
    pub total_entries: usize,
    pub ranked_entries: usize,
    pub winner: Option<CompetitorId>,
    pub winning_entry: Option<EntryId>,
    pub winning_score: Option<f64>,
    pub prizes_awarded: usize,
}

/// Bounded history of concluded competitions plus per-competitor profiles
#[derive(Debug, Default)]
pub struct HallOfFame {
    records: VecDeque<HistoricalRecord>,
    profiles: AHashMap<CompetitorId, WinnerProfile>,
    limit: usize,
}

impl HallOfFame {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(64)),
            profiles: AHashMap::new(),
            limit,
        }
    }

    /// Record a concluded competition and credit its prize winners
    pub fn record(
        &mut self,
        name: &str,
        competition_type: CompetitionType,
        results: &CompetitionResults,
        prizes: &[DistributedPrize],
        now: DateTime<Utc>,
    ) -> &HistoricalRecord {
        let winner = results.overall_winner.as_ref();
        let record = HistoricalRecord {
            competition_id: results.competition_id.clone(),
            competition_name: name.to_string(),
            competition_type,
            concluded_at: now,
            total_entries: results.total_entries,
            ranked_entries: results.rankings.len(),
            winner: winner.map(|w| w.competitor_id.clone()),
            winning_entry: winner.map(|w| w.entry_id.clone()),
            winning_score: winner.map(|w| w.score),
            prizes_awarded: prizes.len(),
        };

        for prize in prizes {
            let profile = self
                .profiles
                .entry(prize.winner.clone())
                .or_insert_with(|| WinnerProfile {
                    competitor_id: Some(prize.winner.clone()),
                    ..Default::default()
                });
            credit(profile, prize, now);
        }

        if self.limit > 0 && self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
        &self.records[self.records.len() - 1]
    }

    pub fn profile(&self, competitor: &CompetitorId) -> Option<&WinnerProfile> {
        self.profiles.get(competitor)
    }

    /// Newest first
    pub fn records(&self) -> impl Iterator<Item = &HistoricalRecord> {
        self.records.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn credit(profile: &mut WinnerProfile, prize: &DistributedPrize, now: DateTime<Utc>) {
    // overall placements count toward the record; category prizes only add rewards
    if prize.category.is_none() {
        match prize.placement {
            Placement::First => {
                profile.wins += 1;
                profile.podiums += 1;
                profile.last_win = Some(now);
            }
            Placement::Second | Placement::Third => profile.podiums += 1,
            Placement::HonorableMention => profile.honorable_mentions += 1,
        }
    }

    if let PrizeKind::Title { ref title } = prize.kind {
        if !profile.titles.contains(title) {
            profile.titles.push(title.clone());
        }
    }
    profile.total_currency += prize.kind.currency_value();
}
