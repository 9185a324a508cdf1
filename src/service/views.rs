//! Read-only projections handed to callers
//!
//! Views are built while the competition lock is held and own all of their data, so a
//! caller can keep one around without blocking commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::competition::{
    CategoryId, Competition, CompetitionEntry, CompetitionId, CompetitionPhase, CompetitorId,
    EntryId, EntryStatus,
};
use crate::config::CompetitionType;
use crate::scoring::{rank_entries, CompetitionResults, PlantRanking, ScoreStatistics};

/// Render a 10-cell bar for a score on the 0-100 scale
pub fn render_score_bar(score: f64) -> String {
    let filled = ((score / 100.0) * 10.0).round().max(0.0) as usize;
    let filled = filled.min(10);
    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Entry counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub draft: usize,
    pub submitted: usize,
    pub under_review: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub disqualified: usize,
}

impl StatusCounts {
    fn add(&mut self, status: EntryStatus) {
        match status {
            EntryStatus::Draft => self.draft += 1,
            EntryStatus::Submitted => self.submitted += 1,
            EntryStatus::UnderReview => self.under_review += 1,
            EntryStatus::Accepted => self.accepted += 1,
            EntryStatus::Rejected => self.rejected += 1,
            EntryStatus::Disqualified => self.disqualified += 1,
            EntryStatus::NotFound => {}
        }
    }

    pub fn total(&self) -> usize {
        self.draft
            + self.submitted
            + self.under_review
            + self.accepted
            + self.rejected
            + self.disqualified
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFill {
    pub category_id: CategoryId,
    pub name: String,
    pub entries: usize,
    pub max_entries: u32,
}

/// Point-in-time overview of one competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionSnapshot {
    pub competition_id: CompetitionId,
    pub name: String,
    pub competition_type: CompetitionType,
    pub phase: CompetitionPhase,
    pub start_date: DateTime<Utc>,
    pub judging_deadline: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub accepting_entries: bool,
    pub registrations: usize,
    pub entries: StatusCounts,
    pub categories: Vec<CategoryFill>,
    pub open_sessions: usize,
    pub is_finalized: bool,
    pub is_validated: bool,
    pub prizes_awarded: usize,
    pub prizes_claimed: usize,
}

impl CompetitionSnapshot {
    pub fn of(competition: &Competition, now: DateTime<Utc>) -> Self {
        let mut entries = StatusCounts::default();
        for entry in competition.entries() {
            entries.add(entry.status());
        }

        let categories = competition
            .categories
            .iter()
            .map(|c| CategoryFill {
                category_id: c.id.clone(),
                name: c.name.clone(),
                entries: competition.category_fill(&c.id),
                max_entries: c.max_entries,
            })
            .collect();

        let results = competition.results();
        Self {
            competition_id: competition.id.clone(),
            name: competition.name.clone(),
            competition_type: competition.competition_type,
            phase: competition.phase(now),
            start_date: competition.start_date,
            judging_deadline: competition.judging_deadline,
            end_date: competition.end_date,
            accepting_entries: competition.is_accepting_entries(now),
            registrations: competition.registrations().len(),
            entries,
            categories,
            open_sessions: competition.open_sessions(),
            is_finalized: results.is_some(),
            is_validated: results.map_or(false, |r| r.is_validated),
            prizes_awarded: competition.prizes().len(),
            prizes_claimed: competition.prizes().iter().filter(|p| p.is_claimed).count(),
        }
    }
}

/// Everything a competitor sees about their entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    pub entry_id: EntryId,
    pub competitor_id: CompetitorId,
    pub category_id: CategoryId,
    pub strain_name: String,
    pub status: EntryStatus,
    pub entry_score: Option<f64>,
    pub statistics: Option<ScoreStatistics>,
    /// Overall rank once results are final
    pub rank: Option<u32>,
    pub submission_date: Option<DateTime<Utc>>,
    pub disqualification_reason: Option<String>,
    pub rejection_reason: Option<String>,
}

impl EntryView {
    pub fn of(entry: &CompetitionEntry, results: Option<&CompetitionResults>) -> Self {
        let rank = results.and_then(|r| {
            r.rankings
                .iter()
                .find(|ranked| ranked.entry_id == entry.id)
                .map(|ranked| ranked.rank)
        });

        Self {
            entry_id: entry.id.clone(),
            competitor_id: entry.competitor_id.clone(),
            category_id: entry.category_id.clone(),
            strain_name: entry.submission().strain_name.clone(),
            status: entry.status(),
            entry_score: entry.entry_score(),
            statistics: ScoreStatistics::from_scores(entry.scores()),
            rank,
            submission_date: entry.submission_date(),
            disqualification_reason: entry.disqualification_reason().map(str::to_string),
            rejection_reason: entry.rejection_reason().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub entry_id: EntryId,
    pub competitor_id: CompetitorId,
    pub category_id: CategoryId,
    pub strain_name: String,
    pub score: f64,
    pub score_bar: String,
}

impl From<&PlantRanking> for LeaderboardRow {
    fn from(ranking: &PlantRanking) -> Self {
        Self {
            rank: ranking.rank,
            entry_id: ranking.entry_id.clone(),
            competitor_id: ranking.competitor_id.clone(),
            category_id: ranking.category_id.clone(),
            strain_name: ranking.strain_name.clone(),
            score: ranking.score,
            score_bar: render_score_bar(ranking.score),
        }
    }
}

/// One page of standings.
///
/// Before finalization the standings are provisional: entries still under review are
/// ranked by their current score and may yet be rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardView {
    pub competition_id: CompetitionId,
    pub category: Option<CategoryId>,
    pub provisional: bool,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_entries: usize,
    pub rows: Vec<LeaderboardRow>,
}

impl LeaderboardView {
    pub fn build(
        competition: &Competition,
        category: Option<&CategoryId>,
        page: usize,
        page_size: usize,
    ) -> Self {
        let (standings, provisional) = standings(competition, category);
        Self::paginate(
            competition.id.clone(),
            category.cloned(),
            provisional,
            &standings,
            page,
            page_size,
        )
    }

    pub(crate) fn paginate(
        competition_id: CompetitionId,
        category: Option<CategoryId>,
        provisional: bool,
        standings: &[PlantRanking],
        page: usize,
        page_size: usize,
    ) -> Self {
        let page_size = page_size.max(1);
        let page = page.max(1);
        let total_entries = standings.len();
        let total_pages = total_entries.div_ceil(page_size);

        let start = (page - 1).saturating_mul(page_size);
        let rows = if start >= total_entries {
            Vec::new()
        } else {
            let end = (start + page_size).min(total_entries);
            standings[start..end].iter().map(LeaderboardRow::from).collect()
        };

        Self {
            competition_id,
            category,
            provisional,
            page,
            page_size,
            total_pages,
            total_entries,
            rows,
        }
    }
}

/// Full standings for a category (or overall), and whether they are provisional
pub(crate) fn standings(
    competition: &Competition,
    category: Option<&CategoryId>,
) -> (Vec<PlantRanking>, bool) {
    match competition.results() {
        Some(results) => (results.ranking_for(category).to_vec(), false),
        None => {
            let live = competition.entries().iter().filter(|e| {
                matches!(e.status(), EntryStatus::UnderReview | EntryStatus::Accepted)
                    && category.map_or(true, |c| &e.category_id == c)
            });
            (rank_entries(live), true)
        }
    }
}
