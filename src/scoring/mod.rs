//! Score aggregation, rankings and competition results

mod aggregator;
mod ranking;


pub use aggregator::*;
pub use ranking::*;
