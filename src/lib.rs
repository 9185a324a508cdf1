//! Chimera Competition Core - plant cultivation competition engine
//!
//! This crate runs the contests of a cultivation game: competitors register, enter plants,
//! judges score them in time-boxed sessions, results are ranked and validated, and prizes
//! are distributed and claimed. Python bindings via PyO3 are available behind the `python`
//! feature.
//!
//! The usual entry point is [`service::CompetitionService`]; the aggregate
//! [`competition::Competition`] can also be driven directly.

pub mod competition;
pub mod condition;
pub mod config;
pub mod error;
pub mod events;
pub mod judging;
pub mod qualification;
pub mod rewards;
pub mod scoring;
pub mod service;
pub mod submission;

#[cfg(feature = "python")]
pub mod bindings;

pub use error::{CompetitionError, Result};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn chimera_competition(m: &Bound<'_, PyModule>) -> PyResult<()> {
    bindings::register(m)
}
