//! Prize distribution and claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::competition::{CategoryId, CompetitionId, CompetitorId, EntryId, PrizeId};
use crate::config::{CompetitionRewards, Placement, PrizeKind};
use crate::error::{CompetitionError, Result};
use crate::scoring::CompetitionResults;

/// A prize awarded to a ranked competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedPrize {
    /// Id of this award; one template can produce several awards
    pub id: PrizeId,
    /// Template the award was made from
    pub prize_id: PrizeId,
    pub competition_id: CompetitionId,
    pub name: String,
    pub placement: Placement,
    pub rank: u32,
    pub category: Option<CategoryId>,
    pub winner: CompetitorId,
    pub entry_id: EntryId,
    pub kind: PrizeKind,
    pub awarded_at: DateTime<Utc>,
    pub is_claimed: bool,
    pub claim_date: Option<DateTime<Utc>>,
}

impl DistributedPrize {
    /// Hand the prize to its winner. Claims are one-shot; a failed claim changes nothing.
    pub fn claim(&mut self, claimant: &CompetitorId, now: DateTime<Utc>) -> Result<()> {
        if &self.winner != claimant {
            return Err(CompetitionError::NotPrizeWinner {
                prize: self.id.clone(),
                claimant: claimant.clone(),
            });
        }
        if self.is_claimed {
            return Err(CompetitionError::AlreadyClaimed(self.id.clone()));
        }
        self.is_claimed = true;
        self.claim_date = Some(now);
        Ok(())
    }
}

/// Award every prize template whose placement is reached in its ranking.
///
/// Fails with *ResultsNotFinalized* or *ResultsNotValidated* without creating anything.
pub fn distribute_prizes(
    rewards: &CompetitionRewards,
    results: Option<&CompetitionResults>,
    competition_id: &CompetitionId,
    now: DateTime<Utc>,
) -> Result<Vec<DistributedPrize>> {
    let results = match results {
        Some(results) if results.is_finalized => results,
        _ => return Err(CompetitionError::ResultsNotFinalized(competition_id.clone())),
    };
    if !results.is_validated {
        return Err(CompetitionError::ResultsNotValidated(competition_id.clone()));
    }

    let mut awards = Vec::new();
    for template in rewards.templates() {
        let ranking = results.ranking_for(template.category.as_ref());
        for ranked in ranking {
            if Placement::from_rank(ranked.rank, rewards.honorable_mentions)
                != Some(template.placement)
            {
                continue;
            }
            awards.push(DistributedPrize {
                id: PrizeId::generate(),
                prize_id: template.id.clone(),
                competition_id: competition_id.clone(),
                name: template.name.clone(),
                placement: template.placement,
                rank: ranked.rank,
                category: template.category.clone(),
                winner: ranked.competitor_id.clone(),
                entry_id: ranked.entry_id.clone(),
                kind: template.kind.clone(),
                awarded_at: now,
                is_claimed: false,
                claim_date: None,
            });
        }
    }

    Ok(awards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlacementReward, Prize};
    use crate::scoring::test_support::{accepted_entry, base_time};

    fn rewards() -> CompetitionRewards {
        CompetitionRewards {
            prizes: vec![Prize {
                id: PrizeId::new("best-indica"),
                name: "Best Indica".into(),
                description: String::new(),
                placement: Placement::First,
                category: Some(CategoryId::new("indica")),
                kind: PrizeKind::Title {
                    title: "Indica Champion".into(),
                },
            }],
            placement_rewards: vec![
                PlacementReward {
                    placement: Placement::First,
                    currency: 1000,
                    reputation: 50,
                    experience: 500,
                },
                PlacementReward {
                    placement: Placement::HonorableMention,
                    currency: 50,
                    reputation: 5,
                    experience: 20,
                },
            ],
            honorable_mentions: 2,
        }
    }

    fn results(validated: bool) -> CompetitionResults {
        let entries: Vec<_> = (0..6)
            .map(|i| {
                let category = if i % 2 == 0 { "indica" } else { "sativa" };
                accepted_entry(&format!("e{}", i), category, 90.0 - i as f64, i)
            })
            .collect();
        let mut results = CompetitionResults::compute(CompetitionId::new("c"), &entries, base_time());
        if validated {
            results.mark_validated(base_time());
        }
        results
    }

    #[test]
    fn test_unfinalized_creates_nothing() {
        let id = CompetitionId::new("c");
        assert_eq!(
            distribute_prizes(&rewards(), None, &id, base_time()),
            Err(CompetitionError::ResultsNotFinalized(id.clone()))
        );
        assert_eq!(
            distribute_prizes(&rewards(), Some(&results(false)), &id, base_time()),
            Err(CompetitionError::ResultsNotValidated(id))
        );
    }

    #[test]
    fn test_awards_follow_rankings() {
        let results = results(true);
        let awards =
            distribute_prizes(&rewards(), Some(&results), &CompetitionId::new("c"), base_time())
                .unwrap();

        // category first place, overall first place, two honorable mentions
        assert_eq!(awards.len(), 4);
        assert_eq!(awards[0].prize_id, PrizeId::new("best-indica"));
        assert_eq!(awards[0].entry_id, EntryId::new("e0"));
        assert_eq!(awards[1].prize_id, PrizeId::new("placement-first"));
        let mentions: Vec<u32> = awards[2..].iter().map(|a| a.rank).collect();
        assert_eq!(mentions, vec![4, 5]);
        assert!(awards.iter().all(|a| !a.is_claimed));
    }

    #[test]
    fn test_claim_once_by_winner() {
        let results = results(true);
        let mut awards =
            distribute_prizes(&rewards(), Some(&results), &CompetitionId::new("c"), base_time())
                .unwrap();
        let prize = &mut awards[0];
        let winner = prize.winner.clone();

        assert!(matches!(
            prize.claim(&CompetitorId::new("impostor"), base_time()),
            Err(CompetitionError::NotPrizeWinner { .. })
        ));
        assert!(!prize.is_claimed);

        prize.claim(&winner, base_time()).unwrap();
        let snapshot = prize.clone();
        assert_eq!(
            prize.claim(&winner, base_time()),
            Err(CompetitionError::AlreadyClaimed(prize.id.clone()))
        );
        assert_eq!(*prize, snapshot);
    }
}
