//! Judges, judging sessions and per-judge scores

mod assignment;
mod judge;
mod score;
mod session;

pub use assignment::*;
pub use judge::*;
pub use score::*;
pub use session::*;
