//! Prize templates and placement rewards

use serde::{Deserialize, Serialize};

use crate::competition::{CategoryId, PrizeId};

/// Competition outcome position used to key rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    First,
    Second,
    Third,
    HonorableMention,
}

impl Placement {
    /// Placement earned by a 1-based rank; ranks past the honorable mentions earn nothing
    pub fn from_rank(rank: u32, honorable_mentions: u32) -> Option<Self> {
        match rank {
            1 => Some(Placement::First),
            2 => Some(Placement::Second),
            3 => Some(Placement::Third),
            r if r > 3 && r - 3 <= honorable_mentions => Some(Placement::HonorableMention),
            _ => None,
        }
    }

    pub fn is_podium(self) -> bool {
        !matches!(self, Placement::HonorableMention)
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::First => write!(f, "1st Place"),
            Placement::Second => write!(f, "2nd Place"),
            Placement::Third => write!(f, "3rd Place"),
            Placement::HonorableMention => write!(f, "Honorable Mention"),
        }
    }
}

/// What a prize grants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrizeKind {
    Currency { amount: u64 },
    Item { item_id: String, quantity: u32 },
    Title { title: String },
    Reputation { points: u32 },
    Bundle {
        currency: u64,
        reputation: u32,
        experience: u32,
    },
}

impl PrizeKind {
    /// In-game currency granted by this prize
    pub fn currency_value(&self) -> u64 {
        match self {
            PrizeKind::Currency { amount } => *amount,
            PrizeKind::Bundle { currency, .. } => *currency,
            _ => 0,
        }
    }
}

/// Prize template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    #[serde(default = "PrizeId::generate")]
    pub id: PrizeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub placement: Placement,
    /// Awarded from this category's ranking, or from the overall ranking when `None`
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub kind: PrizeKind,
}

/// Standard reward granted for a placement in the overall ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReward {
    pub placement: Placement,
    #[serde(default)]
    pub currency: u64,
    #[serde(default)]
    pub reputation: u32,
    #[serde(default)]
    pub experience: u32,
}

impl PlacementReward {
    pub fn to_prize(&self) -> Prize {
        Prize {
            id: PrizeId::new(format!("placement-{}", placement_slug(self.placement))),
            name: self.placement.to_string(),
            description: String::new(),
            placement: self.placement,
            category: None,
            kind: PrizeKind::Bundle {
                currency: self.currency,
                reputation: self.reputation,
                experience: self.experience,
            },
        }
    }
}

fn placement_slug(placement: Placement) -> &'static str {
    match placement {
        Placement::First => "first",
        Placement::Second => "second",
        Placement::Third => "third",
        Placement::HonorableMention => "honorable-mention",
    }
}

/// Rewards offered by a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRewards {
    #[serde(default)]
    pub prizes: Vec<Prize>,
    #[serde(default)]
    pub placement_rewards: Vec<PlacementReward>,
    /// Ranks after third place that still earn an honorable mention
    #[serde(default = "default_honorable_mentions")]
    pub honorable_mentions: u32,
}

fn default_honorable_mentions() -> u32 {
    2
}

impl Default for CompetitionRewards {
    fn default() -> Self {
        Self {
            prizes: Vec::new(),
            placement_rewards: Vec::new(),
            honorable_mentions: default_honorable_mentions(),
        }
    }
}

impl CompetitionRewards {
    /// All prize templates: explicit prizes followed by placement rewards
    pub fn templates(&self) -> Vec<Prize> {
        self.prizes
            .iter()
            .cloned()
            .chain(self.placement_rewards.iter().map(PlacementReward::to_prize))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_from_rank() {
        assert_eq!(Placement::from_rank(1, 2), Some(Placement::First));
        assert_eq!(Placement::from_rank(3, 0), Some(Placement::Third));
        assert_eq!(Placement::from_rank(4, 2), Some(Placement::HonorableMention));
        assert_eq!(Placement::from_rank(5, 2), Some(Placement::HonorableMention));
        assert_eq!(Placement::from_rank(6, 2), None);
        assert_eq!(Placement::from_rank(4, 0), None);
        assert_eq!(Placement::from_rank(0, 2), None);
    }

    #[test]
    fn test_placement_with_unbounded_mentions() {
        assert_eq!(
            Placement::from_rank(4, u32::MAX),
            Some(Placement::HonorableMention)
        );
        assert_eq!(
            Placement::from_rank(u32::MAX, u32::MAX),
            Some(Placement::HonorableMention)
        );
        assert_eq!(Placement::from_rank(2, u32::MAX), Some(Placement::Second));
    }

    #[test]
    fn test_templates_include_placement_rewards() {
        let rewards = CompetitionRewards {
            prizes: vec![Prize {
                id: PrizeId::new("golden-leaf"),
                name: "Golden Leaf".into(),
                description: String::new(),
                placement: Placement::First,
                category: None,
                kind: PrizeKind::Title {
                    title: "Master Grower".into(),
                },
            }],
            placement_rewards: vec![PlacementReward {
                placement: Placement::Second,
                currency: 500,
                reputation: 10,
                experience: 100,
            }],
            honorable_mentions: 2,
        };

        let templates = rewards.templates();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].placement, Placement::Second);
        assert_eq!(templates[1].kind.currency_value(), 500);
        assert_eq!(templates[1].id.as_str(), "placement-second");
    }

    #[test]
    fn test_prize_kind_json_shape() {
        let json = r#"{"name":"Cash","placement":"first","kind":{"kind":"currency","amount":1000}}"#;
        let prize: Prize = serde_json::from_str(json).unwrap();
        assert_eq!(prize.kind, PrizeKind::Currency { amount: 1000 });
        assert!(prize.category.is_none());
    }
}
