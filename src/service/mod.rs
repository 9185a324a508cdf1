//! Competition service and its read-only projections
//!
//! The service is the entry point the game server talks to: it hosts competitions, owns
//! the judge roster and hall of fame, and republishes aggregate events on its broker.

mod engine;
mod views;

#[cfg(test)]
mod property_tests;

pub use engine::*;
pub use views::*;
