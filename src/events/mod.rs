//! Competition events and the broker that delivers them
//!
//! Aggregates collect events while they mutate; the service publishes them once the
//! competition lock has been released.

mod broker;
mod event;

pub use broker::*;
pub use event::*;
