//! Configuration module for competition definitions
//!
//! Competitions are described by game data (JSON) and deserialized with serde. Every
//! loader validates what it reads, so the rest of the engine can rely on well-formed
//! schedules, weights and conditions.

mod competition;
mod judging;
mod rewards;
mod rules;
mod settings;

pub use competition::*;
pub use judging::*;
pub use rewards::*;
pub use rules::*;
pub use settings::*;
