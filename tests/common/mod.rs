//! Shared fixtures for the integration suite

#![allow(dead_code)]

use chimera_competition::competition::{
    CategoryId, CompetitionId, CompetitorId, EntryId, ManualClock, PlantId,
};
use chimera_competition::config::EngineSettings;
use chimera_competition::qualification::ParticipantProfile;
use chimera_competition::service::CompetitionService;
use chimera_competition::submission::{
    AromaProfile, CannabinoidProfile, EntryDocumentation, JournalEntry, PlantSubmission,
    TerpeneProfile, VisualProfile,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

pub const SUMMER_CUP: &str = r#"{
    "id": "summer-cup",
    "name": "Summer Cup",
    "description": "Indoor flower showcase",
    "competition_type": "quality_cup",
    "start_date": "2025-06-01T09:00:00Z",
    "judging_deadline": "2025-06-15T09:00:00Z",
    "end_date": "2025-07-01T09:00:00Z",
    "categories": [
        {"id": "indica", "name": "Indica", "max_entries": 10},
        {"id": "sativa", "name": "Sativa", "max_entries": 10}
    ],
    "rules": {
        "minimum_plant_age": 60,
        "minimum_yield": 10.0,
        "disqualification_criteria": [
            {"reason": "Pesticide residue detected", "condition": "CTM?[3,4]"}
        ]
    },
    "requirements": {"minimum_skill_level": 3},
    "criteria": {"visual_weight": 0.25, "aroma_weight": 0.25, "potency_weight": 0.30, "overall_weight": 0.20},
    "rewards": {
        "prizes": [
            {"id": "best-indica", "name": "Best Indica", "placement": "first", "category": "indica",
             "kind": {"kind": "title", "title": "Indica Champion"}}
        ],
        "placement_rewards": [
            {"placement": "first", "currency": 1000, "reputation": 50, "experience": 500},
            {"placement": "second", "currency": 500, "reputation": 25, "experience": 250}
        ],
        "honorable_mentions": 1
    }
}"#;

pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub fn day(n: i64) -> DateTime<Utc> {
    season_start() + Duration::days(n)
}

pub struct Fixture {
    pub service: Arc<CompetitionService>,
    pub clock: Arc<ManualClock>,
    pub competition: CompetitionId,
}

impl Default for Fixture {
    fn default() -> Self {
        let clock = Arc::new(ManualClock::new(season_start()));
        let service = CompetitionService::new(EngineSettings::default(), clock.clone()).unwrap();
        service.initialize();
        let competition = service.load_competition_json(SUMMER_CUP).unwrap();
        Self {
            service: Arc::new(service),
            clock,
            competition,
        }
    }
}

impl Fixture {
    pub fn at(&self, time: DateTime<Utc>) -> &Self {
        self.clock.set(time);
        self
    }

    /// Register `competitor` in `category`, enter a plant and submit it
    pub fn enter(&self, competitor: &str, category: &str, plant: PlantSubmission) -> EntryId {
        let registration = self
            .service
            .register_participant(&self.competition, profile(competitor, 4), &CategoryId::new(category))
            .unwrap();
        let entry = self
            .service
            .register_entry(&self.competition, &registration.id, plant, documentation())
            .unwrap();
        self.service.submit_entry(&self.competition, &entry).unwrap();
        entry
    }
}

pub fn profile(competitor: &str, skill_level: u32) -> ParticipantProfile {
    ParticipantProfile {
        competitor_id: CompetitorId::new(competitor),
        display_name: competitor.to_string(),
        skill_level,
        age: 28,
        competitions_entered: 2,
        region: "pacific".into(),
        certifications: vec!["organic".into()],
    }
}

pub fn plant(strain: &str, age_days: u32) -> PlantSubmission {
    PlantSubmission {
        plant_id: PlantId::new(format!("plant-{}", strain.to_lowercase().replace(' ', "-"))),
        strain_name: strain.to_string(),
        plant_age_days: age_days,
        yield_grams: 38.0,
        cannabinoids: CannabinoidProfile {
            thc: 22.0,
            cbd: 0.6,
            cbg: 1.0,
            cbn: 0.1,
        },
        terpenes: TerpeneProfile {
            dominant: vec!["limonene".into()],
            total_percent: 3.1,
        },
        visual: VisualProfile {
            trichome_density: 85.0,
            color_score: 80.0,
            structure_score: 78.0,
        },
        aroma: AromaProfile {
            intensity: 72.0,
            complexity: 70.0,
            notes: vec!["citrus".into()],
        },
        contaminants: Vec::new(),
        captured_at: day(1),
    }
}

pub fn documentation() -> EntryDocumentation {
    EntryDocumentation {
        grow_journal: vec![
            JournalEntry {
                day: 1,
                note: "Seedling up".into(),
            },
            JournalEntry {
                day: 45,
                note: "Flowering".into(),
            },
        ],
        photo_count: 8,
        nutrient_schedule: Some("Living soil, top dressed".into()),
        lineage_verified: true,
    }
}
