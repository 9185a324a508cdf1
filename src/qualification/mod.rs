//! Participant registration and qualification

mod checker;
mod registration;

#[cfg(test)]
mod property_tests;

pub use checker::*;
pub use registration::*;
