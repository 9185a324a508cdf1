//! Rankings and competition results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::competition::{
    CategoryId, CompetitionEntry, CompetitionId, CompetitorId, EntryId, EntryStatus, PlantId,
};

/// One ranked entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRanking {
    /// 1-based, dense, no shared ranks
    pub rank: u32,
    pub entry_id: EntryId,
    pub competitor_id: CompetitorId,
    pub category_id: CategoryId,
    pub plant_id: PlantId,
    pub strain_name: String,
    pub score: f64,
    pub submission_date: DateTime<Utc>,
}

/// Winner of a ranking, with how far ahead of the runner-up they finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerSelection {
    /// `None` for the overall winner
    pub category_id: Option<CategoryId>,
    pub entry_id: EntryId,
    pub competitor_id: CompetitorId,
    pub score: f64,
    /// `None` when nobody else was ranked
    pub margin_of_victory: Option<f64>,
}

impl WinnerSelection {
    fn from_ranking(rankings: &[PlantRanking], category_id: Option<CategoryId>) -> Option<Self> {
        let winner = rankings.first()?;
        Some(Self {
            category_id,
            entry_id: winner.entry_id.clone(),
            competitor_id: winner.competitor_id.clone(),
            score: winner.score,
            margin_of_victory: rankings.get(1).map(|runner_up| winner.score - runner_up.score),
        })
    }
}

/// Final standings of a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionResults {
    pub competition_id: CompetitionId,
    /// All ranked entries across categories
    pub rankings: Vec<PlantRanking>,
    pub category_rankings: BTreeMap<CategoryId, Vec<PlantRanking>>,
    pub category_winners: BTreeMap<CategoryId, WinnerSelection>,
    pub overall_winner: Option<WinnerSelection>,
    pub total_entries: usize,
    pub is_finalized: bool,
    pub finalized_at: DateTime<Utc>,
    pub is_validated: bool,
    pub validated_at: Option<DateTime<Utc>>,
}

impl CompetitionResults {
    /// Rank the accepted, scored entries
    pub fn compute(
        competition_id: CompetitionId,
        entries: &[CompetitionEntry],
        now: DateTime<Utc>,
    ) -> Self {
        let accepted = entries
            .iter()
            .filter(|e| e.status() == EntryStatus::Accepted);
        let rankings = rank_entries(accepted);

        let mut category_rankings: BTreeMap<CategoryId, Vec<PlantRanking>> = BTreeMap::new();
        for ranking in &rankings {
            let list = category_rankings
                .entry(ranking.category_id.clone())
                .or_default();
            list.push(PlantRanking {
                rank: list.len() as u32 + 1,
                ..ranking.clone()
            });
        }

        let category_winners = category_rankings
            .iter()
            .filter_map(|(category, list)| {
                WinnerSelection::from_ranking(list, Some(category.clone()))
                    .map(|w| (category.clone(), w))
            })
            .collect();

        Self {
            overall_winner: WinnerSelection::from_ranking(&rankings, None),
            competition_id,
            rankings,
            category_rankings,
            category_winners,
            total_entries: entries.len(),
            is_finalized: true,
            finalized_at: now,
            is_validated: false,
            validated_at: None,
        }
    }

    /// Ranking a prize is drawn from: one category, or overall
    pub fn ranking_for(&self, category: Option<&CategoryId>) -> &[PlantRanking] {
        match category {
            Some(category) => self
                .category_rankings
                .get(category)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &self.rankings,
        }
    }

    /// Consistency problems between these results and the entries they were computed
    /// from; empty when the results are sound
    pub fn problems(&self, entries: &[CompetitionEntry]) -> Vec<String> {
        let mut problems = Vec::new();

        if self.rankings.len() > entries.len() {
            problems.push(format!(
                "{} rankings for {} entries",
                self.rankings.len(),
                entries.len()
            ));
        }

        check_ranking("overall", &self.rankings, &mut problems);
        for (category, list) in &self.category_rankings {
            check_ranking(category.as_str(), list, &mut problems);
            if list.iter().any(|r| &r.category_id != category) {
                problems.push(format!("{} ranking lists entries of other categories", category));
            }
        }

        for ranking in &self.rankings {
            match entries.iter().find(|e| e.id == ranking.entry_id) {
                None => problems.push(format!("ranked entry {} does not exist", ranking.entry_id)),
                Some(entry) if entry.status() != EntryStatus::Accepted => problems.push(format!(
                    "ranked entry {} is {}",
                    ranking.entry_id,
                    entry.status()
                )),
                Some(_) => {}
            }
        }

        for (category, winner) in &self.category_winners {
            let first = self
                .category_rankings
                .get(category)
                .and_then(|list| list.first());
            if first.map(|r| &r.entry_id) != Some(&winner.entry_id) {
                problems.push(format!("{} winner is not ranked first", category));
            }
        }

        problems
    }

    pub fn mark_validated(&mut self, now: DateTime<Utc>) {
        self.is_validated = true;
        self.validated_at = Some(now);
    }
}

fn check_ranking(label: &str, rankings: &[PlantRanking], problems: &mut Vec<String>) {
    for (i, ranking) in rankings.iter().enumerate() {
        if ranking.rank as usize != i + 1 {
            problems.push(format!(
                "{} rank at position {} is {}",
                label,
                i + 1,
                ranking.rank
            ));
        }
    }
    if rankings.windows(2).any(|pair| pair[1].score > pair[0].score) {
        problems.push(format!("{} scores are not in descending order", label));
    }
}

/// Rank scored entries: score descending, then earlier submission, then entry id.
///
/// Entries without a score or submission date are left out.
pub fn rank_entries<'a>(
    entries: impl IntoIterator<Item = &'a CompetitionEntry>,
) -> Vec<PlantRanking> {
    let mut scored: Vec<(&CompetitionEntry, f64, DateTime<Utc>)> = entries
        .into_iter()
        .filter_map(|e| Some((e, e.entry_score()?, e.submission_date()?)))
        .collect();

    scored.sort_by(|(a, sa, da), (b, sb, db)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| da.cmp(db))
            .then_with(|| a.id.cmp(&b.id))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (entry, score, submitted))| PlantRanking {
            rank: i as u32 + 1,
            entry_id: entry.id.clone(),
            competitor_id: entry.competitor_id.clone(),
            category_id: entry.category_id.clone(),
            plant_id: entry.submission().plant_id.clone(),
            strain_name: entry.submission().strain_name.clone(),
            score,
            submission_date: submitted,
        })
        .collect()
}
