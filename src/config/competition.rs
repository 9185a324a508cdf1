//! Competition definition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CompetitionRequirements, CompetitionRewards, CompetitionRules, JudgingCriteria};
use crate::competition::{CategoryId, CompetitionId, Metadata};
use crate::error::{CompetitionError, Result};

/// Kind of competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionType {
    StrainShowcase,
    YieldChallenge,
    QualityCup,
    TerpeneMasters,
    Regional,
    National,
    International,
    Seasonal,
}

/// Category definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Generated when omitted; required for prizes scoped to this category
    #[serde(default)]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_entries: u32,
}

/// Full definition of a competition, as loaded from game data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionConfig {
    #[serde(default)]
    pub id: Option<CompetitionId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub competition_type: CompetitionType,
    pub start_date: DateTime<Utc>,
    /// Entries close at this instant
    pub judging_deadline: DateTime<Utc>,
    /// Scores are no longer accepted after this instant
    pub end_date: DateTime<Utc>,
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub rules: CompetitionRules,
    #[serde(default)]
    pub requirements: CompetitionRequirements,
    #[serde(default)]
    pub criteria: JudgingCriteria,
    #[serde(default)]
    pub rewards: CompetitionRewards,
    #[serde(default)]
    pub metadata: Metadata,
}

impl CompetitionConfig {
    /// Parse and validate a competition definition
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CompetitionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CompetitionError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("competition name must not be empty"));
        }

        if !(self.start_date < self.judging_deadline && self.judging_deadline < self.end_date) {
            return Err(invalid(
                "schedule must satisfy start_date < judging_deadline < end_date",
            ));
        }

        if self.categories.is_empty() {
            return Err(invalid("at least one category is required"));
        }

        for (i, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(invalid(&format!("category #{} has no name", i + 1)));
            }
            if category.max_entries == 0 {
                return Err(invalid(&format!(
                    "category '{}' must allow at least one entry",
                    category.name
                )));
            }
            if let Some(ref id) = category.id {
                let duplicate = self.categories[..i]
                    .iter()
                    .any(|other| other.id.as_ref() == Some(id));
                if duplicate {
                    return Err(invalid(&format!("duplicate category id '{}'", id)));
                }
            }
        }

        if self.rules.minimum_yield < 0.0 || !self.rules.minimum_yield.is_finite() {
            return Err(invalid("minimum_yield must be a non-negative number"));
        }
        self.rules.validate()?;

        if self.requirements.region_restricted && self.requirements.eligible_regions.is_empty() {
            return Err(invalid(
                "region restricted competitions must list eligible regions",
            ));
        }

        let templates = self.rewards.templates();
        for (i, prize) in templates.iter().enumerate() {
            if templates[..i].iter().any(|other| other.id == prize.id) {
                return Err(invalid(&format!("duplicate prize id '{}'", prize.id)));
            }
        }

        for prize in &self.rewards.prizes {
            if let Some(ref category) = prize.category {
                let known = self
                    .categories
                    .iter()
                    .any(|c| c.id.as_ref() == Some(category));
                if !known {
                    return Err(invalid(&format!(
                        "prize '{}' references unknown category '{}'",
                        prize.name, category
                    )));
                }
            }
        }

        Ok(())
    }
}

fn invalid(message: &str) -> CompetitionError {
    CompetitionError::InvalidConfig(message.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub fn season_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    /// A two-category quality cup running for 30 days
    pub fn sample_config() -> CompetitionConfig {
        let start = season_start();
        CompetitionConfig {
            id: Some(CompetitionId::new("summer-cup")),
            name: "Summer Cup".into(),
            description: "Indoor flower showcase".into(),
            competition_type: CompetitionType::QualityCup,
            start_date: start,
            judging_deadline: start + Duration::days(14),
            end_date: start + Duration::days(30),
            categories: vec![
                CategoryConfig {
                    id: Some(CategoryId::new("indica")),
                    name: "Indica".into(),
                    description: String::new(),
                    max_entries: 10,
                },
                CategoryConfig {
                    id: Some(CategoryId::new("sativa")),
                    name: "Sativa".into(),
                    description: String::new(),
                    max_entries: 10,
                },
            ],
            rules: CompetitionRules {
                minimum_plant_age: 60,
                minimum_yield: 10.0,
                ..Default::default()
            },
            requirements: CompetitionRequirements::default(),
            criteria: JudgingCriteria::default(),
            rewards: CompetitionRewards::default(),
            metadata: Metadata::default(),
        }
    }
}
