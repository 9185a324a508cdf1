//! Grow documentation attached to an entry

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub day: u32,
    pub note: String,
}

/// Evidence of how the plant was grown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryDocumentation {
    pub grow_journal: Vec<JournalEntry>,
    pub photo_count: u32,
    pub nutrient_schedule: Option<String>,
    pub lineage_verified: bool,
}

impl EntryDocumentation {
    pub fn is_complete(&self) -> bool {
        self.missing_items().is_empty()
    }

    /// Missing documentation items, in the order they are reported
    pub fn missing_items(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.grow_journal.is_empty() {
            missing.push("grow journal");
        }
        if self.photo_count == 0 {
            missing.push("photos");
        }
        if self
            .nutrient_schedule
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            missing.push("nutrient schedule");
        }
        if !self.lineage_verified {
            missing.push("lineage verification");
        }
        missing
    }
}
